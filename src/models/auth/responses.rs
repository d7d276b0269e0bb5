use serde::Deserialize;
use ts_rs::TS;

use super::entities::CurrentUser;

// 登录响应，兼容 token / accessToken 两种字段名
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: CurrentUser,
}
