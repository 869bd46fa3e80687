#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshAction {
    FullRefresh,
    PriorityRefresh,
    NoOp,
}

impl RefreshAction {
    pub fn label(self) -> &'static str {
        match self {
            RefreshAction::FullRefresh => "full",
            RefreshAction::PriorityRefresh => "priority",
            RefreshAction::NoOp => "none",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    full_tick: u64,
    priority_tick: u64,
    full_interval: u64,
    priority_interval: u64,
}

impl Scheduler {
    pub fn new(full_interval: u64, priority_interval: u64) -> Self {
        Self {
            full_tick: 0,
            priority_tick: 0,
            full_interval: full_interval.max(1),
            priority_interval: priority_interval.max(1),
        }
    }

    pub fn full_tick(&self) -> u64 {
        self.full_tick
    }

    pub fn priority_tick(&self) -> u64 {
        self.priority_tick
    }

    /// Full refresh wins over a priority refresh due on the same tick.
    pub fn decide(&self, has_priority_games: bool) -> RefreshAction {
        if self.full_tick % self.full_interval == 0 {
            RefreshAction::FullRefresh
        } else if has_priority_games && self.priority_tick % self.priority_interval == 0 {
            RefreshAction::PriorityRefresh
        } else {
            RefreshAction::NoOp
        }
    }

    pub fn advance(&mut self) {
        self.full_tick = self.full_tick.wrapping_add(1);
        self.priority_tick = self.priority_tick.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(scheduler: &mut Scheduler, ticks: usize, has_priority: bool) -> Vec<RefreshAction> {
        (0..ticks)
            .map(|_| {
                let action = scheduler.decide(has_priority);
                scheduler.advance();
                action
            })
            .collect()
    }

    #[test]
    fn first_tick_is_full_refresh() {
        let scheduler = Scheduler::new(60, 5);
        assert_eq!(scheduler.decide(false), RefreshAction::FullRefresh);
        assert_eq!(scheduler.decide(true), RefreshAction::FullRefresh);
    }

    #[test]
    fn cadence_over_a_window() {
        let mut scheduler = Scheduler::new(6, 2);
        let actions = run(&mut scheduler, 13, true);
        use RefreshAction::*;
        assert_eq!(
            actions,
            [
                FullRefresh,
                NoOp,
                PriorityRefresh,
                NoOp,
                PriorityRefresh,
                NoOp,
                FullRefresh,
                NoOp,
                PriorityRefresh,
                NoOp,
                PriorityRefresh,
                NoOp,
                FullRefresh,
            ]
        );
    }

    #[test]
    fn priority_refresh_needs_priority_games() {
        let mut scheduler = Scheduler::new(10, 1);
        scheduler.advance();
        assert_eq!(scheduler.decide(false), RefreshAction::NoOp);
        assert_eq!(scheduler.decide(true), RefreshAction::PriorityRefresh);
    }

    #[test]
    fn zero_intervals_are_clamped() {
        let mut scheduler = Scheduler::new(0, 0);
        let actions = run(&mut scheduler, 3, true);
        assert!(actions.iter().all(|a| *a == RefreshAction::FullRefresh));
    }
}
