//! 关联查询结果归一化
//!
//! PostgREST 的嵌入关联可能返回对象、数组或 null，这里统一收敛成 `Option<T>`

use serde::Deserialize;

/// 一对一或一对多的关联结果
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Relation<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Relation<T> {
    /// 取第一条记录
    pub fn into_first(self) -> Option<T> {
        match self {
            Relation::One(item) => Some(item),
            Relation::Many(items) => items.into_iter().next(),
        }
    }
}

/// 把可能为空的关联结果归一化
pub fn normalize<T>(relation: Option<Relation<T>>) -> Option<T> {
    relation.and_then(Relation::into_first)
}
