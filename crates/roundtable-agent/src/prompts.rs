// ABOUTME: Fixed instructions the orchestrator sends alongside the transcript.
// ABOUTME: Turn instructions are per-call only; the consolidation request is persisted before the summary.

/// Appended to the transcript right before the final summary call.
pub const CONSOLIDATION_INSTRUCTION: &str = "Based on the entire collaboration above, write a final \
    consolidated summary with: 1) agreed decisions, 2) key deliverables, 3) open questions. \
    Be thorough.";

/// Instruction for one agent's turn. Round 1 asks for an opening perspective;
/// later rounds push the panel toward a decided plan.
pub fn turn_instruction(agent_name: &str, round: u32, max_rounds: u32) -> String {
    if round <= 1 {
        format!(
            "You are {agent_name}. Analyze the requirement above and contribute your perspective. \
             Other agents will follow."
        )
    } else {
        format!(
            "You are {agent_name}. This is round {round}/{max_rounds}. Review the discussion so far, \
             address open questions raised by other agents, make concrete decisions, and converge \
             toward a final actionable plan. Do NOT ask the user for clarification — decide based \
             on what the team discussed."
        )
    }
}

/// Label a reply so later agents can see who said it.
pub fn attributed_reply(agent_name: &str, reply: &str) -> String {
    format!("[{}]: {}", agent_name, reply)
}
