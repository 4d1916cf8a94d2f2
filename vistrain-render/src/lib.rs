mod blit;
pub mod chart;
pub mod gabor;
pub mod layout;
pub mod letters;
pub mod renderer;
pub mod text;

pub use chart::{draw_chart, tumbling_e_pixmap, ChartView};
pub use gabor::{gabor_pixmap, GaborCache};
pub use layout::{
    answer_buttons, chart_panels, line_rows, optotype_center, training_zones, Bounds,
    BUTTON_STRIP,
};
pub use letters::{letter_path, letter_pixmap};
pub use renderer::{FrameStats, SkiaRenderer, TrainingView};
pub use text::{load_font, render_text_pixmap, TextCache};
