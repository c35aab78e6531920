//! Plot configuration shared across visualization modules

use plotters::prelude::*;

/// Default series palette, cycled when there are more series than colors
pub const COLOR_POOL: [RGBColor; 14] = [
    RGBColor(31, 119, 180),  // #1f77b4
    RGBColor(255, 127, 14),  // #ff7f0e
    RGBColor(33, 112, 33),   // #217021
    RGBColor(214, 39, 40),   // #d62728
    RGBColor(148, 103, 189), // #9467bd
    RGBColor(140, 86, 75),   // #8c564b
    RGBColor(227, 119, 194), // #e377c2
    RGBColor(127, 127, 127), // #7f7f7f
    RGBColor(231, 231, 36),  // #e7e724
    RGBColor(23, 190, 207),  // #17becf
    RGBColor(0, 9, 10),      // #00090a
    RGBColor(95, 238, 51),   // #5fee33
    RGBColor(252, 186, 3),   // #fcba03
    RGBColor(161, 75, 160),  // #a14ba0
];

/// Configuration for customizing plots
///
/// # Fields
///
/// - `width`, `height`: Dimensions in pixels
/// - `title`: Plot title
/// - `xlabel`: X-axis label (empty: use the time column header)
/// - `series_colors`: Optional palette replacing [`COLOR_POOL`]
/// - `background`: Background color
/// - `line_width`: Line thickness in pixels
/// - `show_grid`: Whether to show grid lines
///
/// # Example
///
/// ```rust,ignore
/// use setpoint_sweep::output::visualization::PlotConfig;
///
/// let mut config = PlotConfig::recording("D20TIC0188: 10% Downstep");
/// config.width = 1920;
/// ```
#[derive(Clone, Debug)]
pub struct PlotConfig {
    /// Image width in pixels (default: 1400)
    pub width: u32,

    /// Image height in pixels (default: 700)
    pub height: u32,

    /// Plot title (default: "Recording")
    pub title: String,

    /// X-axis label (default: empty, the time column header is used)
    pub xlabel: String,

    /// Optional palette, one color per series in drawing order
    pub series_colors: Option<Vec<RGBColor>>,

    /// Background color (default: WHITE)
    pub background: RGBColor,

    /// Line width in pixels (default: 2)
    pub line_width: u32,

    /// Show grid lines (default: true)
    pub show_grid: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 700,
            title: "Recording".to_string(),
            xlabel: String::new(),
            series_colors: None,
            background: WHITE,
            line_width: 2,
            show_grid: true,
        }
    }
}

/// Helper trait to accept both `String` and `None` for optional titles
pub trait IntoOptionalTitle {
    fn into_optional_title(self) -> Option<String>;
}

impl IntoOptionalTitle for &str {
    fn into_optional_title(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl IntoOptionalTitle for String {
    fn into_optional_title(self) -> Option<String> {
        Some(self)
    }
}

impl<T: IntoOptionalTitle> IntoOptionalTitle for Option<T> {
    fn into_optional_title(self) -> Option<String> {
        self.and_then(|t| t.into_optional_title())
    }
}

/// Constant for no title (default title will be used)
pub const NO_TITLE: Option<&str> = None;

impl PlotConfig {
    /// Config for a recorded CSV with optional custom title
    ///
    /// ```rust,ignore
    /// let config = PlotConfig::recording("State 3: PIC +10%");
    /// let config = PlotConfig::recording(NO_TITLE);
    /// ```
    pub fn recording(title: impl IntoOptionalTitle) -> Self {
        let mut config = Self::default();
        config.title = title
            .into_optional_title()
            .unwrap_or_else(|| "Recording".to_string());
        config
    }

    /// Builder pattern: set the series palette
    pub fn with_colors(mut self, colors: Vec<RGBColor>) -> Self {
        self.series_colors = Some(colors);
        self
    }

    /// Builder pattern: set image size
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Color of the series (or unit axis) at index i
    ///
    /// Uses custom colors if provided, otherwise cycles through [`COLOR_POOL`]
    pub(crate) fn get_series_color(&self, index: usize) -> RGBColor {
        match &self.series_colors {
            Some(colors) if !colors.is_empty() => colors[index % colors.len()],
            _ => COLOR_POOL[index % COLOR_POOL.len()],
        }
    }
}

/// Parse a `#rrggbb` color
///
/// ```rust
/// use setpoint_sweep::output::visualization::parse_hex_color;
/// use plotters::style::RGBColor;
///
/// assert_eq!(parse_hex_color("#1f77b4"), Some(RGBColor(31, 119, 180)));
/// assert_eq!(parse_hex_color("blue"), None);
/// ```
pub fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

// =================================================================================================
// Tests
// =================================================================================================
