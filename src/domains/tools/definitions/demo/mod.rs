pub mod counter;
pub mod echo;
pub mod hello_world;

pub use counter::CounterIncrementTool;
pub use echo::EchoTool;
pub use hello_world::HelloWorldTool;
