//! Gamification profile command

use anyhow::Result;
use finsmart_core::{GamificationEngine, Store};

pub fn cmd_game(store: &dyn Store) -> Result<()> {
    let profile = GamificationEngine::new().evaluate(&store.activities()?);

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           🏆 FinSmart Progress          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Level:           {}", profile.level);
    println!(
        "  Points:          {} (next level at {})",
        profile.points, profile.next_level_points
    );
    println!(
        "  Streak:          {} days (best {})",
        profile.current_streak, profile.longest_streak
    );

    println!();
    println!(
        "  🎯 Challenges ({}/{} done)",
        profile.completed_challenges(),
        profile.challenges.len()
    );
    for challenge in &profile.challenges {
        let mark = if challenge.is_completed() { "✓" } else { " " };
        println!(
            "     [{}] {:<20} {:>3}/{:<3} +{} pts",
            mark, challenge.name, challenge.progress, challenge.target, challenge.points
        );
    }

    println!();
    if profile.badges.is_empty() {
        println!("  🏅 No badges yet");
    } else {
        println!("  🏅 Badges");
        for badge in &profile.badges {
            println!("     {} ({}) - {}", badge.name, badge.earned_on, badge.description);
        }
    }
    Ok(())
}
