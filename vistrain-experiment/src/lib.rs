pub mod chart;
pub mod config;
pub mod session;
pub mod store;

pub use chart::{
    letter_choices, BinocularMode, ChartEngine, ChartEvent, ChartLine, ChartState, ChartStats,
    ChartStatus, ChartTransition, ChartVocabulary, Eye, GridStyle, LineSpec, Optotype,
    OptotypeProgress, CHART_LINES,
};
pub use config::{ChartConfig, ConfigLoadError, EngineConfig, Surface, TrainingConfig};
pub use session::{SessionEvent, TrainingSession};
pub use store::{submit_logged, JsonLinesStore, MemorySink, SessionSink, StoreError};
