//! End-to-end integration tests driving a bound server over real
//! WebSockets.

mod helpers;

mod call_test;
mod chat_test;
mod meeting_test;
mod ws_test;
