pub mod cycle_state;
pub mod framework;
pub mod gpu_memory_filter;
pub mod node_info;
pub mod plugins;
pub mod policy;

pub use framework::{FilterFramework, NodeSelection, RejectedNode};
pub use gpu_memory_filter::GpuMemoryFilter;
pub use plugins::{Code, Filter, Handle, Plugin, SchedulingContext, Status};
