//! 回复属性聚合。
//!
//! 规则按存储顺序折叠：某属性第一次出现时确定运算符并开启值列表，
//! 之后同名属性只追加值，运算符以第一次为准。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::service::ReplyRule;

/// 单个属性的聚合结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyValue {
    pub op: String,
    pub value: Vec<String>,
}

/// 属性名 → 聚合值；按属性名排序输出。
pub type ReplyDocument = BTreeMap<String, ReplyValue>;

/// 将回复规则聚合为回复文档。属性名为空的规则直接跳过。
pub fn aggregate_replies(rules: &[ReplyRule]) -> ReplyDocument {
    let mut document = ReplyDocument::new();
    for rule in rules {
        if rule.attribute.trim().is_empty() {
            continue;
        }
        document
            .entry(rule.attribute.clone())
            .and_modify(|entry| entry.value.push(rule.value.clone()))
            .or_insert_with(|| ReplyValue {
                op: rule.op.clone(),
                value: vec![rule.value.clone()],
            });
    }
    document
}
