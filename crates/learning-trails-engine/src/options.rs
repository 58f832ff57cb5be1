/// Behaviour switches threaded through trail parsing and loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Replace `<block id>` content from the string table.
    pub localization_enabled: bool,
    /// Step titles render in a header, so title blocks directly under a step
    /// are not kept as blocks.
    pub step_title_in_header: bool,
    /// Allow trails to be re-read from disk while authoring.
    pub authoring_support_enabled: bool,
}
