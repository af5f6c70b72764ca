use std::cmp::Ordering;

use super::types::Strategy;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RankKey {
    pub balance: f64,
    pub apr: f64,
    pub interest: f64,
}

impl Strategy {
    pub(crate) fn compare(self, a: &RankKey, b: &RankKey) -> Ordering {
        match self {
            Strategy::SmallestBalanceFirst => a
                .balance
                .total_cmp(&b.balance)
                .then_with(|| b.apr.total_cmp(&a.apr)),
            Strategy::HighestAprFirst => b
                .apr
                .total_cmp(&a.apr)
                .then_with(|| b.balance.total_cmp(&a.balance)),
            Strategy::InterestWeightedFirst => b
                .interest
                .total_cmp(&a.interest)
                .then_with(|| b.apr.total_cmp(&a.apr)),
        }
    }
}

/// Returns indices into `keys` in priority order. Full ties keep input order.
pub(crate) fn rank(strategy: Strategy, keys: &[(usize, RankKey)]) -> Vec<usize> {
    let mut ranked: Vec<&(usize, RankKey)> = keys.iter().collect();
    ranked.sort_by(|(_, a), (_, b)| strategy.compare(a, b));
    ranked.into_iter().map(|(index, _)| *index).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(balance: f64, apr: f64) -> RankKey {
        RankKey {
            balance,
            apr,
            interest: balance * apr / 1200.0,
        }
    }

    #[test]
    fn smallest_balance_first_breaks_ties_by_higher_apr() {
        let keys = vec![
            (0, key(500.0, 10.0)),
            (1, key(200.0, 12.0)),
            (2, key(200.0, 25.0)),
            (3, key(900.0, 30.0)),
        ];
        assert_eq!(rank(Strategy::SmallestBalanceFirst, &keys), vec![2, 1, 0, 3]);
    }

    #[test]
    fn highest_apr_first_breaks_ties_by_larger_balance() {
        let keys = vec![
            (0, key(500.0, 19.99)),
            (1, key(200.0, 24.99)),
            (2, key(800.0, 24.99)),
            (3, key(50.0, 5.0)),
        ];
        assert_eq!(rank(Strategy::HighestAprFirst, &keys), vec![2, 1, 0, 3]);
    }

    #[test]
    fn interest_weighted_first_orders_by_dollar_interest() {
        // 1000 @ 24% accrues 20/month, 4000 @ 6% accrues 20/month, 3000 @ 12% accrues 30/month.
        let keys = vec![
            (0, key(1000.0, 24.0)),
            (1, key(4000.0, 6.0)),
            (2, key(3000.0, 12.0)),
        ];
        assert_eq!(rank(Strategy::InterestWeightedFirst, &keys), vec![2, 0, 1]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let keys = vec![(4, key(100.0, 10.0)), (1, key(100.0, 10.0))];
        for strategy in Strategy::ALL {
            assert_eq!(rank(strategy, &keys), vec![4, 1]);
        }
    }
}
