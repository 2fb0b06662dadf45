//! tracing 구독자 초기화
//!
//! 라이브러리 코드는 구독자를 직접 설치하지 않는다. 바이너리/테스트에서
//! `init_tracing()`을 한 번 호출하면 `RUST_LOG`를 따른다.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "chain_launch=info";

/// 이미 설치된 구독자가 있으면 아무 것도 하지 않음
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
    {
        tracing::debug!("tracing 초기화 완료");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
