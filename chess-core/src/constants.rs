//! 规则常量定义

/// 七十五回合规则：半回合计数达到此值时对局自动结束
pub const MOVE_LIMIT_HALFMOVES: u32 = 150;

/// 五次重复局面自动判和
pub const REPETITION_LIMIT: usize = 5;
