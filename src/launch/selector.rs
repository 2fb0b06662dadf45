//! 모드 선택 결정표
//!
//! | 힌트      | 원격 도달 | forceRemote | 결과                      |
//! |-----------|-----------|-------------|---------------------------|
//! | remote    | ≥1        | -           | remote                    |
//! | remote    | 0         | -           | 오류: no remotes          |
//! | direct    | (생략)    | true        | 오류: 설정 충돌           |
//! | direct    | (생략)    | false       | 로컬 direct               |
//! | server    | (생략)    | true        | 오류: 설정 충돌           |
//! | server    | (생략)    | false       | 로컬 server               |
//! | 없음      | ≥1        | -           | remote                    |
//! | 없음      | 0         | true        | 오류: forceRemote         |
//! | 없음      | 0         | false       | 로컬 direct               |

use crate::config::LaunchMode;
use crate::error::LaunchError;

#[derive(Debug)]
pub enum ModeDecision {
    Remote,
    Local(LaunchMode),
    Fail(LaunchError),
}

/// 원격 프로브가 필요한지 (명시적 direct/server면 생략)
pub fn should_probe(hint: Option<LaunchMode>) -> bool {
    !matches!(hint, Some(LaunchMode::Direct) | Some(LaunchMode::Server))
}

pub fn select_mode(hint: Option<LaunchMode>, force_remote: bool, reachable: usize) -> ModeDecision {
    match (hint, reachable > 0) {
        (Some(mode), _) if force_remote && mode.is_local() => ModeDecision::Fail(LaunchError::config(format!(
            "forceRemote cannot be combined with mode {}",
            mode
        ))),
        (Some(LaunchMode::Direct), _) => ModeDecision::Local(LaunchMode::Direct),
        (Some(LaunchMode::Server), _) => ModeDecision::Local(LaunchMode::Server),
        (Some(LaunchMode::Remote), true) => ModeDecision::Remote,
        (Some(LaunchMode::Remote), false) => ModeDecision::Fail(LaunchError::NoRemotes),
        (None, true) => ModeDecision::Remote,
        (None, false) if force_remote => ModeDecision::Fail(LaunchError::ForceRemote),
        (None, false) => ModeDecision::Local(LaunchMode::Direct),
    }
}
