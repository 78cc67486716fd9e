//! Cable handling for physics-driven props.
//!
//! Cables are chains of jointed segments. Interior segments can be pinned to
//! [`PinnableSurface`]s; end segments carry [`Connector`]s and plug into each
//! other. A player's [`ObjectHolder`] drives both through the same
//! pick up / drop lifecycle as any other [`Liftable`] object.

pub mod cable_connector;
pub mod chain;
pub mod config;
pub mod connector;
pub mod error;
pub mod holder;
pub mod liftable;
pub mod pin_point;
pub mod player_mode;
pub mod rig;
pub mod segment;
pub mod selection;
pub mod surface;

pub use cable_connector::CableConnector;
pub use chain::{CableChain, ChainMember};
pub use config::CablingConfig;
pub use connector::{ConnectionPose, Connector, ConnectorKind, Gender};
pub use error::{CablingError, ConfigError};
pub use holder::ObjectHolder;
pub use liftable::Liftable;
pub use pin_point::{PinPoint, SurfaceHit};
pub use player_mode::{PlayerMode, PlayerModeContext};
pub use rig::{Cable, CableRig, CableSpec};
pub use segment::SegmentState;
pub use selection::Selectable;
pub use surface::PinnableSurface;
