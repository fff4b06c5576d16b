//! Time-based trace viewport: processing, stacking, viewport transitions,
//! render command generation, hit-testing and interaction handling.

pub mod config;
pub mod controller;
pub mod debounce;
pub mod export;
pub mod layout;
pub mod model;
pub mod processor;
pub mod render;
pub mod selection;
pub mod session;
pub mod stacking;
pub mod transform;
pub mod viewport;
pub mod waterfall;

pub use config::{ConfigError, LayoutConfig};
pub use controller::{Controller, DragState, Toggle};
pub use hit_test::Hit;
pub use layout::{Band, BandLayout, ContentKind};
pub use model::{Annotation, FrameNode, InputError, InteractionEvent, Milestone, NetworkRequest, ProcessedTrace};
pub use processor::{ParseError, ProcessOptions, RawTraceEvent, process_trace};
pub use render::{Content, Hover, Scene, SceneData, render};
pub use selection::{ClickOutcome, Selection};
pub use session::{ExportTicket, TraceSession};
pub use viewport::{DataBounds, DisplayFlags, ViewState, ViewTransition};
pub use waterfall::{ProcessedNetwork, process_network_data};
