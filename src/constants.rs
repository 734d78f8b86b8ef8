// Video Remixer Constants
// Fixed processing directives and on-disk layout names. The ffmpeg values
// match the production invocation and are deliberately non-configurable:
// they keep the external process inside a small memory envelope.

// Resource caps passed to every ffmpeg invocation
pub const FFMPEG_THREADS: u32 = 1;
pub const FFMPEG_FILTER_THREADS: u32 = 1;

// Output encoding
pub const OUTPUT_WIDTH: u32 = 320;
pub const OUTPUT_HEIGHT: u32 = 568;
pub const OUTPUT_CRF: u32 = 30;
pub const OUTPUT_PRESET: &str = "medium";

// Color directive: two-valued hue rotation, sign follows the filter's
// colorTemperature parameter
pub const HUE_SHIFT: f64 = 0.02;
pub const COLOR_MIX_PREFIX: &str = "colormix";
pub const COLOR_TEMPERATURE_PARAM: &str = "colorTemperature";

// Speed option set used when the catalog does not provide one
pub const DEFAULT_SPEED_OPTIONS: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

// Clip clamp floor: a drawn window is never shorter than this (capped by
// the source duration itself)
pub const MIN_CLIP_SECONDS: f64 = 0.1;

// Workspace layout
pub const CONFIG_FOLDER: &str = "config";
pub const GENERATED_FOLDER: &str = "generated";
pub const UPLOADS_FOLDER: &str = "uploads";
pub const OUTPUTS_FOLDER: &str = "outputs";
pub const LOGS_FOLDER: &str = "logs";
pub const CATALOG_FILENAME: &str = "parameters.json";
pub const PREFERENCES_FILENAME: &str = "preferences.json";

// File naming
pub const OUTPUT_FILE_PREFIX: &str = "output-";
pub const OUTPUT_FILE_EXT: &str = "mp4";
pub const LOG_FILE_PREFIX: &str = "video-remixer";

// Diagnostics: how many trailing stderr lines to carry in failures
pub const STDERR_TAIL_LINES: usize = 10;
