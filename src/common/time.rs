// src/common/time.rs

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Instante atual truncado em microssegundos (a mesma precisão do Postgres),
/// para que os dois repositórios guardem datas idênticas.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::microseconds(1)).unwrap_or(now)
}

/// Novo `updated_at` para um registro: nunca igual nem anterior ao atual.
pub fn bumped(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + Duration::microseconds(1))
}
