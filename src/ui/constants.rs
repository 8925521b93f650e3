// ui/constants.rs

pub const TITLE: &str = r#" ____            _
|  _ \ __ _ _ __| | ___ _   _
| |_) / _` | '__| |/ _ \ | | |
|  __/ (_| | |  | |  __/ |_| |
|_|   \__,_|_|  |_|\___|\__, |
                        |___/
"#;

pub const MENU_HINT: &str = "↑/↓ 选择  Enter 开始  l 查看记录  q 退出";
pub const PERSONA_HINT: &str = "↑/↓ 选择对手  Enter 开始谈判  Esc 返回";
pub const PLAYING_HINT: &str = " Enter 发送  Esc 放弃本局 ";
pub const RESULT_HINT: &str = "r 再试一次  s 保存记录  m 返回菜单";
pub const BROWSER_HINT: &str = "↑/↓ 选择  Enter 打开  Esc 返回";
pub const VIEWER_HINT: &str = "↑/↓ 滚动  Esc 返回列表";
