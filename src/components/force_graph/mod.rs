//! Force-directed graph visualization component.
//!
//! Renders an interactive force-directed graph on an HTML canvas with:
//! - Physics-based node positioning via a d3-style force simulation
//! - Pan, zoom, and node dragging interactions
//! - A relationship-type legend that filters edges on click
//! - Hover highlights and tooltips layered over the active filter
//! - Straight or arc-shaped directed edges
//!
//! # Example
//!
//! ```ignore
//! use relation_graph::{ColumnMapping, ForceGraphCanvas, parse_csv, process_rows};
//!
//! let rows = parse_csv("Source,RelationshipType,Target\nAlice,Friend,Bob\n")?;
//! let model = Arc::new(process_rows(&rows, &ColumnMapping::default())?);
//!
//! view! { <ForceGraphCanvas data=Signal::derive(move || model.clone()) directed=true fullscreen=true /> }
//! ```

mod component;
pub mod interaction;
pub mod legend;
mod render;
pub mod scale;
pub mod scene;
pub mod simulation;
pub mod state;
pub mod theme;

pub use component::ForceGraphCanvas;
pub use interaction::{FilterState, HoverTarget, InteractionState};
pub use legend::{Legend, LegendEntry};
pub use simulation::{SimNode, Simulation, SimulationConfig};
pub use state::ForceGraphState;
pub use theme::Theme;
