use colored::Colorize;
use enum_iterator::all;
use rand::thread_rng;

use skipbo_sim_rs::games::skipbo::{EventKind, FnSink, NullSink, SkipBoGame, Strategy};
use skipbo_sim_rs::runner::run_batch;
use skipbo_sim_rs::stats::{
    chi_square_test, cohen_d, confidence_interval, power, quartiles, required_sample_size,
    standard_deviation,
};

fn main() {
    verbose_game(Strategy::Optimiert, Strategy::Zufall);
    matchup_report(Strategy::Optimiert, Strategy::Zufall, 1000);
    round_robin(500);
}

fn print_event(kind: EventKind, message: &str) {
    let tag = format!("{:?}", kind).to_uppercase();
    let line = format!("[{}] {}", tag, message);
    let colored_line = match kind {
        EventKind::Warn => line.yellow(),
        EventKind::Success => line.green(),
        EventKind::Turn => line.bright_black(),
        EventKind::Start | EventKind::Reset => line.cyan(),
        EventKind::Info => line.blue(),
    };
    println!("{}", colored_line);
}

/// One fully logged game, the way the dashboard showed its live log.
fn verbose_game(strategy_p1: Strategy, strategy_p2: Strategy) {
    println!(
        "--- sample game: {} vs {} ---",
        strategy_p1.label(),
        strategy_p2.label()
    );
    let mut rng = thread_rng();
    let mut sink = FnSink(print_event);
    let mut game = SkipBoGame::new(strategy_p1, strategy_p2);
    let result = game.run(&mut rng, &mut sink);
    println!("{}", serde_json::to_string(&result).unwrap());
}

/// Silent batch plus the statistical comparison of the two strategies.
fn matchup_report(strategy_p1: Strategy, strategy_p2: Strategy, count: u32) {
    let mut rng = thread_rng();
    let summary = run_batch(strategy_p1, strategy_p2, count, &mut rng, &mut NullSink);

    println!(
        "\n--- {} games: {} vs {} ---",
        summary.games,
        strategy_p1.label(),
        strategy_p2.label()
    );
    println!(
        "wins: {} / {} (ties {}), avg turns {:.1}, avg wilds {:.1}",
        summary.wins_p1,
        summary.wins_p2,
        summary.ties,
        summary.average_turns(),
        summary.average_wilds()
    );

    let ci = confidence_interval(summary.win_rate_p1(), summary.games, 0.95);
    println!(
        "P1 win rate {:.1}% (95% CI {:.1}% - {:.1}%)",
        summary.win_rate_p1() * 100.0,
        ci.lower * 100.0,
        ci.upper * 100.0
    );

    let chi = chi_square_test(
        summary.wins_p1,
        summary.games - summary.wins_p1,
        summary.wins_p2,
        summary.games - summary.wins_p2,
    );
    println!(
        "chi-square {:.2}, p-value {:.3} -> {}",
        chi.statistic,
        chi.p_value,
        if chi.is_significant {
            "significant difference"
        } else {
            "no significant difference"
        }
    );

    let turns = summary.turn_series();
    let q = quartiles(&turns);
    println!(
        "turns: min {} q1 {:.1} median {:.1} q3 {:.1} max {} (sd {:.1})",
        q.min,
        q.q1,
        q.median,
        q.q3,
        q.max,
        standard_deviation(&turns)
    );

    // Win-rate gap expressed as an effect size on the win indicator
    let p1 = summary.win_rate_p1();
    let p2 = summary.wins_p2 as f64 / summary.games.max(1) as f64;
    let sd1 = (p1 * (1.0 - p1)).sqrt();
    let sd2 = (p2 * (1.0 - p2)).sqrt();
    let effect = cohen_d(p1, p2, sd1, sd2, summary.games, summary.games);
    println!(
        "effect size d {:.2} ({}), power at n={}: {:.2}, n for 80% power: {}",
        effect.d,
        effect.interpretation,
        summary.games,
        power(summary.games, effect.d),
        required_sample_size(effect.d)
    );
}

/// Every strategy against every other, tallied over silent batches.
fn round_robin(count: u32) {
    println!("\n--- round robin, {} games per matchup ---", count);
    let mut rng = thread_rng();
    for strategy_p1 in all::<Strategy>() {
        for strategy_p2 in all::<Strategy>() {
            if strategy_p1 == strategy_p2 {
                continue;
            }
            let summary = run_batch(strategy_p1, strategy_p2, count, &mut rng, &mut NullSink);
            println!(
                "{:>15} vs {:<15} {:>4} - {:<4} (ties {}, avg turns {:.1})",
                strategy_p1.label(),
                strategy_p2.label(),
                summary.wins_p1,
                summary.wins_p2,
                summary.ties,
                summary.average_turns()
            );
        }
    }
}
