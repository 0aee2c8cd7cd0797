pub mod checkpoints;
pub mod milestones;
pub mod sign_off;
