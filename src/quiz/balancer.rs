//! 正确答案位置均衡：让一批题目的正确选项均匀分布在 4 个位置上，且相邻两题不落在同一位置。

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::question::{Question, RawQuestion};

pub const ANSWER_SLOTS: usize = 4;
const FALLBACK_OPTIONS: [&str; ANSWER_SLOTS] = ["A", "B", "C", "D"];
const DEFAULT_MAX_RESHUFFLES: u8 = 8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalancerConfig {
    /// 启发式整理后仍有相邻重复时，最多重新洗牌的次数；用尽后改用构造式排列。
    pub max_reshuffles: u8,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            max_reshuffles: DEFAULT_MAX_RESHUFFLES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceReport {
    pub questions: Vec<Question>,
    /// 选项经过占位修补的题目下标。
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patched: Vec<usize>,
    pub reshuffles: u8,
    pub constructive: bool,
}

impl BalanceReport {
    pub fn is_clean(&self) -> bool {
        self.patched.is_empty()
    }
}

/// 长度为 `len` 的位置池：0,1,2,3,0,1,...
pub fn build_pool(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % ANSWER_SLOTS) as u8).collect()
}

/// Fisher–Yates：从末尾向前，每个元素与 `[0, i]` 中随机一个交换。
pub fn shuffle_pool<R: Rng>(pool: &mut [u8], rng: &mut R) {
    for i in (1..pool.len()).rev() {
        let j = rng.gen_range(0..=i);
        pool.swap(i, j);
    }
}

/// 单次前向扫描：遇到与前一个相同的值，就把后面第一个不同的值换过来。
pub fn declump(pool: &mut [u8]) {
    for i in 1..pool.len() {
        if pool[i] != pool[i - 1] {
            continue;
        }
        if let Some(j) = (i + 1..pool.len()).find(|&j| pool[j] != pool[i]) {
            pool.swap(i, j);
        }
    }
}

/// 末尾两项仍相同时，与最靠前的、自身及后继都不等于末值的位置交换。
pub fn fix_tail(pool: &mut [u8]) {
    if pool.len() < 2 {
        return;
    }
    let last = pool.len() - 1;
    let value = pool[last];
    if pool[last - 1] != value {
        return;
    }
    let mut i = 0;
    while i + 1 < last {
        if pool[i] != value && pool[i + 1] != value {
            pool.swap(last, i);
            return;
        }
        i += 1;
    }
}

pub fn has_adjacent_repeat(pool: &[u8]) -> bool {
    pool.windows(2).any(|pair| pair[0] == pair[1])
}

/// 构造式排列：每步在与上一项不同的值中选剩余最多的（并列时随机）。
fn constructive_order<R: Rng>(pool: &[u8], rng: &mut R) -> Vec<u8> {
    let mut counts = [0usize; ANSWER_SLOTS];
    for &slot in pool {
        counts[usize::from(slot)] += 1;
    }

    let mut order = Vec::with_capacity(pool.len());
    let mut previous: Option<usize> = None;
    for _ in 0..pool.len() {
        let best = (0..ANSWER_SLOTS)
            .filter(|&slot| counts[slot] > 0 && Some(slot) != previous)
            .map(|slot| counts[slot])
            .max();
        let candidates: Vec<usize> = (0..ANSWER_SLOTS)
            .filter(|&slot| counts[slot] > 0 && Some(slot) != previous)
            .filter(|&slot| Some(counts[slot]) == best)
            .collect();
        let slot = if candidates.is_empty() {
            // 只剩与上一项相同的值
            match (0..ANSWER_SLOTS).find(|&slot| counts[slot] > 0) {
                Some(slot) => slot,
                None => break,
            }
        } else {
            candidates[rng.gen_range(0..candidates.len())]
        };
        counts[slot] -= 1;
        order.push(slot as u8);
        previous = Some(slot);
    }
    order
}

/// 为 `len` 道题分配正确答案位置，返回 (位置池, 重洗次数, 是否使用构造式排列)。
pub fn assign_slots<R: Rng>(len: usize, config: &BalancerConfig, rng: &mut R) -> (Vec<u8>, u8, bool) {
    let mut pool = build_pool(len);
    for attempt in 0..=config.max_reshuffles {
        shuffle_pool(&mut pool, rng);
        declump(&mut pool);
        fix_tail(&mut pool);
        if !has_adjacent_repeat(&pool) {
            return (pool, attempt, false);
        }
        log::debug!(
            "answer slots still clumped after pass {} for batch of {}",
            attempt + 1,
            len
        );
    }
    (constructive_order(&pool, rng), config.max_reshuffles, true)
}

/// 把正确答案移到 `target`，其余选项保持原相对顺序填入剩余位置。返回 (选项, 是否修补过)。
pub fn remap_options(raw: &RawQuestion, target: u8) -> (Vec<String>, bool) {
    let target = usize::from(target);
    let mut patched = false;

    let options: Vec<String> = match &raw.options {
        Some(options) => {
            patched |= options.len() != ANSWER_SLOTS;
            options.clone()
        }
        None => {
            patched = true;
            FALLBACK_OPTIONS.iter().map(|option| option.to_string()).collect()
        }
    };

    let correct_index = raw
        .correct_answer_index
        .and_then(|index| usize::try_from(index).ok())
        .filter(|&index| index < options.len());
    let correct_text = match correct_index.and_then(|index| options.get(index)) {
        Some(text) if !text.is_empty() => text.clone(),
        _ => {
            patched = true;
            options
                .first()
                .filter(|text| !text.is_empty())
                .cloned()
                .unwrap_or_else(|| placeholder("Opção", target))
        }
    };

    let mut others = options
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != correct_index)
        .map(|(_, text)| text);

    let mut remapped = Vec::with_capacity(ANSWER_SLOTS);
    for slot in 0..ANSWER_SLOTS {
        if slot == target {
            remapped.push(correct_text.clone());
            continue;
        }
        let text = match others.next() {
            Some(text) if *text == correct_text => {
                patched = true;
                placeholder("Alternativa", slot)
            }
            Some(text) if !text.is_empty() => text.clone(),
            _ => {
                patched = true;
                placeholder("Opção", slot)
            }
        };
        remapped.push(text);
    }

    (remapped, patched)
}

fn placeholder(label: &str, slot: usize) -> String {
    format!("{label} {}", slot + 1)
}

pub fn balance_questions<R: Rng>(raw: &[RawQuestion], rng: &mut R) -> Vec<Question> {
    balance_questions_with_report(raw, &BalancerConfig::default(), rng).questions
}

pub fn balance_questions_with_report<R: Rng>(
    raw: &[RawQuestion],
    config: &BalancerConfig,
    rng: &mut R,
) -> BalanceReport {
    let (slots, reshuffles, constructive) = assign_slots(raw.len(), config, rng);
    let mut patched = Vec::new();

    let questions = raw
        .iter()
        .zip(slots)
        .enumerate()
        .map(|(index, (question, target))| {
            let (options, was_patched) = remap_options(question, target);
            if was_patched {
                patched.push(index);
            }
            Question {
                id: String::new(),
                text: question.text.clone(),
                options,
                correct_answer_index: target,
                explanation: question.explanation.clone(),
            }
        })
        .collect();

    if !patched.is_empty() {
        log::warn!(
            "patched options on {} of {} generated questions",
            patched.len(),
            raw.len()
        );
    }

    BalanceReport {
        questions,
        patched,
        reshuffles,
        constructive,
    }
}

/// 均衡之后由调用方分配 id：`{prefix}-{index}`。
pub fn assign_ids(questions: &mut [Question], prefix: &str) {
    for (index, question) in questions.iter_mut().enumerate() {
        question.id = format!("{prefix}-{index}");
    }
}
