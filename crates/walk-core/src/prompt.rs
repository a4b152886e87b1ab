use crate::document::Position;

/// Builds the per-step instruction sent to the model.
///
/// The grid size is context only; nothing enforces it, and the walker may leave the nominal grid.
pub fn build_step_prompt(grid_size: u32, step: usize, position: Position) -> String {
    format!(
        "You are a random walker in a grid of size {grid_size} x {grid_size} which is centered at (0,0).\n\
         You started at step = 0 and your current step is {step}, with your position being {position}\n\
         Your task is to reply with either UP, DOWN, LEFT or RIGHT to move in any direction that you want.\n\
         If you find that the direction you choose will put you out of the Grid size - {grid_size} x {grid_size} reply with STOP.\n\
         Do not reply with any other extra words apart from the above.\n"
    )
}
