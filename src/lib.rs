#![forbid(unsafe_code)]

pub mod core;
pub mod dispatch;
pub mod draw;
pub mod driver;
pub mod error;
pub mod presenter;
pub mod registry;
pub mod scene;
pub mod script;
pub mod surface;
pub mod topics;

pub use core::{Rgba8, Viewport};
pub use dispatch::{Selection, TopicRenderer};
pub use draw::{DrawParams, SceneDraw};
pub use driver::{Advance, AnimationDriver};
pub use error::{SceneError, SceneResult};
pub use presenter::{Presenter, ScriptFrame, render_script};
pub use registry::RendererFactory;
pub use scene::SceneInstance;
pub use script::{NarrationLineScene, NarrationScript, stable_hash64};
pub use surface::{Label, Surface};
