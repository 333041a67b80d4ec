//! Splitting a dinner bill with a tip, a shared bottle and a refund.
//!
//! Shows how leftover cents land on random participants while every
//! currency still adds up exactly.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tabulator::core::ledger::Ledger;
use tabulator::core::participant::Participant;

fn main() {
    println!("╔══════════════════════════════════════╗");
    println!("║  tabulator: Dinner Split Example     ║");
    println!("╚══════════════════════════════════════╝\n");

    // Seeded so the output is the same on every run.
    let mut rng = StdRng::seed_from_u64(2024);
    let mut ledger = Ledger::new();

    let ana = Participant::new("Ana");
    let ben = Participant::new("Ben");
    let cai = Participant::new("Cai");
    let everyone = vec![ana.clone(), ben.clone(), cai.clone()];

    ledger.create_bill("Dinner").expect("bill title is not blank");

    let entries: [(&str, &str, Vec<Participant>, bool, bool); 4] = [
        ("Mains", "$64.00", everyone.clone(), false, false),
        ("Wine", "$9.50", vec![ana.clone(), cai.clone()], true, false),
        ("Tip", "$10", everyone.clone(), false, false),
        ("Ana paid", "$93", vec![ana.clone()], false, true),
    ];
    for (title, value, participants, each, credit) in entries {
        ledger
            .create_item(value, Some(title), &participants, each, credit, &mut rng)
            .expect("demo input is valid");
    }

    if let Some(bill) = ledger.active_bill() {
        println!("{}", bill);
    }

    println!("━━━ After a second bill in euros ━━━\n");
    ledger.create_bill("Gelato").expect("bill title is not blank");
    ledger
        .create_item("4,50€", Some("Cones"), &everyone, true, false, &mut rng)
        .expect("demo input is valid");

    println!("{}", ledger.totals());
}
