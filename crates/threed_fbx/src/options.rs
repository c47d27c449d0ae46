//! Options controlling how a document is turned into a scene.

use bon::Builder;

/// Options for loading a document into a [`threed_scene::Scene`]
///
/// Both flags only change how the `GlobalSettings` block is interpreted; scanning and parsing
/// are unaffected.
///
/// ```
/// use threed_fbx::FbxLoadOptions;
///
/// let options = FbxLoadOptions::builder()
///     .keep_builtin_global_settings(true)
///     .build();
/// assert!(!options.compatible_mode);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct FbxLoadOptions {
    /// Copy every `GlobalSettings` property into [`threed_scene::AssetInfo::properties`]
    #[builder(default)]
    pub keep_builtin_global_settings: bool,

    /// Also read the legacy `Properties60` layout of `GlobalSettings`
    #[builder(default)]
    pub compatible_mode: bool,
}
