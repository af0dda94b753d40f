//! Prompt templates for the newsroom generation request.

pub mod newsroom;

pub use newsroom::{
    newsroom_user_prompt, NEWSROOM_SYSTEM, NEWSROOM_USER_TEMPLATE, SCRIPT_PLACEHOLDERS,
};
