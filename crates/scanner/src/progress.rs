use common::types::LoadingStage;

/// Renderable progress for one address's load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInfo {
    pub percent: u8,
    pub label: &'static str,
}

/// Map a record's loading stage to its fixed percent and label.
/// An absent stage means the tracker is inactive for that record — a
/// fully loaded record carries no stage field at all once the server is
/// done with it. The auto-hide delay after `Complete` is presentation
/// behavior and lives with the renderer.
pub fn stage_info(stage: Option<LoadingStage>) -> Option<StageInfo> {
    stage.map(|s| StageInfo {
        percent: s.percent(),
        label: s.label(),
    })
}
