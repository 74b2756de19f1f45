//! 按整数权重随机抽取
//!
//! 抽取与随机源分离：调用方传入 [`WeightDraw`]，测试中可注入固定的抽取值。

use crate::entities::reward_entity;
use crate::error::{AppError, AppResult};
use rand::Rng;

/// 提供权重的候选项
pub trait Weighted {
    fn weight(&self) -> i64;
}

impl Weighted for reward_entity::Model {
    fn weight(&self) -> i64 {
        i64::from(self.weight)
    }
}

impl<T> Weighted for (T, i64) {
    fn weight(&self) -> i64 {
        self.1
    }
}

/// 随机源：返回 [1, total] 闭区间内的均匀整数
pub trait WeightDraw {
    fn draw(&mut self, total: i64) -> i64;
}

/// 默认随机源（线程本地 RNG）
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDraw;

impl WeightDraw for ThreadRngDraw {
    fn draw(&mut self, total: i64) -> i64 {
        rand::thread_rng().gen_range(1..=total)
    }
}

impl<F> WeightDraw for F
where
    F: FnMut(i64) -> i64,
{
    fn draw(&mut self, total: i64) -> i64 {
        self(total)
    }
}

/// 非负权重之和（负权重按 0 计）
pub fn total_weight<T: Weighted>(items: &[T]) -> i64 {
    items.iter().map(|item| item.weight().max(0)).sum()
}

/// 按给定顺序累加权重，返回第一个累计值 >= 抽取值的元素。
///
/// 总权重 <= 0 时返回 [`AppError::InvalidRewardWeights`]，不会退化为均匀抽取。
pub fn pick_weighted<'a, T, D>(items: &'a [T], source: &mut D) -> AppResult<&'a T>
where
    T: Weighted,
    D: WeightDraw + ?Sized,
{
    let total = total_weight(items);
    if total <= 0 {
        return Err(AppError::InvalidRewardWeights);
    }

    let roll = source.draw(total).clamp(1, total);
    let mut acc = 0i64;
    for item in items {
        acc += item.weight().max(0);
        if roll <= acc {
            return Ok(item);
        }
    }

    // acc 最终等于 total 且 roll <= total，循环内必然返回
    Err(AppError::InternalError(format!(
        "weighted walk overran: roll {roll}, total {total}"
    )))
}
