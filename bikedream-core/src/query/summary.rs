//! Category summaries.

use serde::Serialize;

use crate::model::{Category, Motorcycle};

/// Per-category roll-up with the most interesting records up front.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub count: u64,
    pub featured_motorcycles: Vec<Motorcycle>,
}

/// Build summaries for every category, respecting `hide_unavailable` and
/// the selected region. Featured records are the top `k` by interest
/// score descending, id ascending.
pub fn category_summary(
    motorcycles: &[Motorcycle],
    region: Option<&str>,
    hide_unavailable: bool,
    top_k: usize,
) -> Vec<CategorySummary> {
    Category::ALL
        .iter()
        .map(|&category| {
            let mut members: Vec<&Motorcycle> = motorcycles
                .iter()
                .filter(|m| m.category == category)
                .filter(|m| !(hide_unavailable && m.hidden_for(region)))
                .collect();
            members.sort_by(|a, b| {
                b.user_interest_score
                    .cmp(&a.user_interest_score)
                    .then_with(|| a.id.cmp(&b.id))
            });

            CategorySummary {
                category,
                count: members.len() as u64,
                featured_motorcycles: members.into_iter().take(top_k).cloned().collect(),
            }
        })
        .collect()
}
