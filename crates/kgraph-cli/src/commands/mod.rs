//! CLI 명령어 구현 모듈.

pub mod output;
pub mod pairs;
pub mod show;
