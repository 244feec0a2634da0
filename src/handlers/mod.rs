pub mod tool_handlers;

pub use tool_handlers::ToolHandlers;
