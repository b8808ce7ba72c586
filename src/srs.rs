use crate::models::{Card, CardId};
use rand::Rng;
use std::collections::VecDeque;

/// How many recently shown cards are kept out of the draw.
pub const RECENCY_LEN: usize = 2;

/// The ids of the last cards shown, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecencyWindow {
    ids: VecDeque<CardId>,
}

impl RecencyWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: CardId) -> bool {
        self.ids.contains(&id)
    }

    pub fn push(&mut self, id: CardId) {
        self.ids.push_back(id);
        while self.ids.len() > RECENCY_LEN {
            self.ids.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> Vec<CardId> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Outcome of one call to [`select_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Chosen { card: CardId, window: RecencyWindow },
    /// Every card was excluded. The window has been cleared and the caller
    /// has to ask again with it.
    Retry { window: RecencyWindow },
    /// There is nothing to draw from at all.
    EmptyDeck,
}

/// Picks the next card by weight among the cards not in `window`.
///
/// Candidates are walked in deck order, subtracting each weight from a
/// value drawn uniformly in `[0, total)`; the first card that brings it to
/// zero or below wins. When every candidate weighs nothing the first one is
/// taken.
pub fn select_next<R: Rng + ?Sized>(cards: &[Card], window: &RecencyWindow, rng: &mut R) -> Selection {
    let candidates: Vec<&Card> = cards.iter().filter(|c| !window.contains(c.id)).collect();

    if candidates.is_empty() {
        if window.is_empty() {
            return Selection::EmptyDeck;
        }
        return Selection::Retry {
            window: RecencyWindow::new(),
        };
    }

    let chosen = draw(&candidates, rng);

    let mut window = window.clone();
    window.push(chosen);
    Selection::Chosen { card: chosen, window }
}

fn draw<R: Rng + ?Sized>(candidates: &[&Card], rng: &mut R) -> CardId {
    let total: f64 = candidates.iter().map(|c| c.weight.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return candidates[0].id;
    }

    let mut remaining = rng.gen_range(0.0..total);
    for card in candidates {
        remaining -= card.weight.max(0.0);
        if remaining <= 0.0 {
            return card.id;
        }
    }

    // Rounding can leave a sliver above zero after the last subtraction.
    candidates[candidates.len() - 1].id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PromptRef;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn deck(weights: &[f64]) -> Vec<Card> {
        weights
            .iter()
            .zip(1..)
            .map(|(&w, id)| Card::with_weight(id, PromptRef::new(format!("q{}", id)), id.to_string(), w))
            .collect()
    }

    fn chosen(selection: Selection) -> (CardId, RecencyWindow) {
        match selection {
            Selection::Chosen { card, window } => (card, window),
            other => panic!("expected a card, got {:?}", other),
        }
    }

    #[test]
    fn test_window_keeps_last_two() {
        let mut window = RecencyWindow::new();
        window.push(1);
        window.push(2);
        window.push(3);
        assert_eq!(window.ids(), vec![2, 3]);
        assert!(!window.contains(1));
    }

    #[test]
    fn test_third_pick_of_three_is_forced() {
        let cards = deck(&[5.0, 5.0, 5.0]);
        let mut rng = StdRng::seed_from_u64(7);

        let (a, window) = chosen(select_next(&cards, &RecencyWindow::new(), &mut rng));
        let (b, window) = chosen(select_next(&cards, &window, &mut rng));
        assert_ne!(a, b);
        assert_eq!(window.ids(), vec![a, b]);

        let remaining = cards.iter().map(|c| c.id).find(|&id| id != a && id != b).unwrap();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (c, _) = chosen(select_next(&cards, &window, &mut rng));
            assert_eq!(c, remaining);
        }
    }

    #[test]
    fn test_no_repeat_within_three_picks() {
        let cards = deck(&[0.5, 9.0, 1.0, 3.0, 0.1]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut window = RecencyWindow::new();
        let mut picks = Vec::new();

        for _ in 0..2_000 {
            let (card, next) = chosen(select_next(&cards, &window, &mut rng));
            picks.push(card);
            window = next;
        }

        for run in picks.windows(3) {
            assert_ne!(run[0], run[1]);
            assert_ne!(run[0], run[2]);
            assert_ne!(run[1], run[2]);
        }
    }

    #[test]
    fn test_frequencies_follow_weights() {
        let cards = deck(&[1.0, 2.0, 3.0, 4.0, 10.0]);
        let mut window = RecencyWindow::new();
        window.push(5);
        let mut rng = StdRng::seed_from_u64(1234);
        let draws = 50_000;

        let mut counts: HashMap<CardId, usize> = HashMap::new();
        for _ in 0..draws {
            let (card, _) = chosen(select_next(&cards, &window, &mut rng));
            *counts.entry(card).or_default() += 1;
        }

        assert_eq!(counts.get(&5), None);
        for (id, weight) in [(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)] {
            let observed = *counts.get(&id).unwrap_or(&0) as f64 / draws as f64;
            let expected = weight / 10.0;
            assert!(
                (observed - expected).abs() < 0.015,
                "card {}: observed {:.4}, expected {:.4}",
                id,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_zero_weights_pick_first_candidate() {
        let cards = deck(&[0.0, 0.0, 0.0]);
        let mut window = RecencyWindow::new();
        window.push(1);
        let mut rng = StdRng::seed_from_u64(3);

        let (card, window) = chosen(select_next(&cards, &window, &mut rng));
        assert_eq!(card, 2);
        assert_eq!(window.ids(), vec![1, 2]);
    }

    #[test]
    fn test_all_excluded_asks_for_retry() {
        let cards = deck(&[5.0, 5.0]);
        let mut window = RecencyWindow::new();
        window.push(1);
        window.push(2);
        let mut rng = StdRng::seed_from_u64(0);

        match select_next(&cards, &window, &mut rng) {
            Selection::Retry { window } => assert!(window.is_empty()),
            other => panic!("expected retry, got {:?}", other),
        }
    }

    #[test]
    fn test_single_card_deck_keeps_returning_it() {
        let cards = deck(&[5.0]);
        let mut rng = StdRng::seed_from_u64(9);
        let (first, window) = chosen(select_next(&cards, &RecencyWindow::new(), &mut rng));
        assert_eq!(first, 1);

        let window = match select_next(&cards, &window, &mut rng) {
            Selection::Retry { window } => window,
            other => panic!("expected retry, got {:?}", other),
        };
        let (again, _) = chosen(select_next(&cards, &window, &mut rng));
        assert_eq!(again, 1);
    }

    #[test]
    fn test_empty_deck() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(select_next(&[], &RecencyWindow::new(), &mut rng), Selection::EmptyDeck);
    }
}
