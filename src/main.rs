//! tabulator CLI
//!
//! Record shared expenses and see who owes what, from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Start a bill and add items to it
//! tabulator new-bill --title "Ski trip"
//! tabulator add --value '€120,00' --title Cabin --participants Me,You,Sam
//! tabulator add --value 15 --each --participants Me,Sam
//!
//! # See balances across every bill
//! tabulator standings --format json
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::env;
use std::process;
use tabulator::core::currency::CurrencyKey;
use tabulator::core::ledger::{Ledger, Startup};
use tabulator::core::participant::{Participant, Roster, RosterError};
use tabulator::settlement::engine::SettlementEngine;
use tabulator::simulation::random_bill::{generate_random_bill, RandomBillConfig};
use tabulator::store::json_file::JsonFileStore;
use tabulator::store::RosterStore;

const DEFAULT_DATA_DIR: &str = "tabulator-data";

fn print_usage() {
    eprintln!(
        r#"tabulator — split shared bills to the cent

USAGE:
    tabulator [--data <DIR>] <COMMAND> [OPTIONS]

COMMANDS:
    bills           List bills; the active one is marked with *
    new-bill        Create a bill and make it active
    select          Make another bill active
    rename          Rename the active bill
    delete-bill     Delete the active bill and its items
    delete-all      Delete every bill
    add             Add an item to the active bill
    delete-item     Delete an item from the active bill
    show            Show the active bill's items and balances
    standings       Show balances summed over all bills
    archive         Print every bill as plain text
    participants    List or edit the participant roster
    generate        Print a random bill's settlement (for testing)
    help            Show this message

OPTIONS:
    --data <DIR>            Data directory (default: $TABULATOR_DATA_DIR or ./tabulator-data)
    --title <TEXT>          new-bill, rename, add
    --index <N>             select, delete-item
    --value <AMOUNT>        add: e.g. '$12.50', '12,50€', '1.234,56'
    --participants <LIST>   add: comma-separated names from the roster
    --each                  add: amount is per participant
    --credit                add: amount is owed back
    --format <FORMAT>       standings: text (default) or json

PARTICIPANTS:
    tabulator participants [list]
    tabulator participants add <NAME>
    tabulator participants remove <NAME>
    tabulator participants replace <A,B,...>

OPTIONS (generate):
    --participants <N>      Number of participants (default: 5)
    --items <N>             Number of items (default: 20)
    --currencies <LIST>     Comma-separated prefix symbols (default: $)
    --seed <N>              Seed for reproducible output"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Parsed `--flag value` pairs and bare `--switch`es.
struct Options {
    values: HashMap<String, String>,
    switches: Vec<String>,
}

impl Options {
    fn parse(args: &[String], value_flags: &[&str], switch_flags: &[&str]) -> Self {
        let mut values = HashMap::new();
        let mut switches = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            if value_flags.contains(&arg) {
                i += 1;
                let value = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail(format!("{} requires a value", arg)));
                values.insert(arg.to_string(), value);
            } else if switch_flags.contains(&arg) {
                switches.push(arg.to_string());
            } else {
                fail(format!("Unknown option: {}", arg));
            }
            i += 1;
        }
        Self { values, switches }
    }

    fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(|s| s.as_str())
    }

    fn require(&self, flag: &str) -> &str {
        self.get(flag)
            .unwrap_or_else(|| fail(format!("{} is required", flag)))
    }

    fn index(&self, flag: &str) -> usize {
        self.require(flag)
            .parse()
            .unwrap_or_else(|_| fail(format!("{} requires a number", flag)))
    }

    fn has(&self, switch: &str) -> bool {
        self.switches.iter().any(|s| s == switch)
    }
}

/// Pull a global `--data <DIR>` off the front of the argument list.
///
/// Only the position before the command is searched, so a command option
/// whose value happens to be `--data` is left alone.
fn take_data_dir(args: &mut Vec<String>) -> Option<String> {
    if args.get(1).map(String::as_str) != Some("--data") {
        return None;
    }
    if args.len() < 3 {
        fail("--data requires a directory");
    }
    let dir = args.remove(2);
    args.remove(1);
    Some(dir)
}

fn open_store(dir: &str) -> JsonFileStore {
    JsonFileStore::open(dir).unwrap_or_else(|e| fail(format!("cannot open '{}': {}", dir, e)))
}

fn load_ledger(store: &JsonFileStore) -> Ledger {
    let mut ledger = Ledger::load(store).unwrap_or_else(|e| fail(e));
    if ledger.initialize() == Startup::NeedsFirstBill {
        log::info!("No bills yet");
    }
    ledger
}

fn save_ledger(ledger: &Ledger, store: &mut JsonFileStore) {
    ledger.save(store).unwrap_or_else(|e| fail(e));
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn cmd_bills(store: &JsonFileStore) {
    let ledger = load_ledger(store);
    if ledger.bills().is_empty() {
        println!("No bills yet. Create one with: tabulator new-bill --title <NAME>");
        return;
    }
    for (i, bill) in ledger.bills().iter().enumerate() {
        let marker = if ledger.last_active_index() == Some(i) { "*" } else { " " };
        let status = match bill.is_balanced() {
            Some(true) => "settled",
            Some(false) => "unsettled",
            None => "empty",
        };
        println!(
            "{} [{}] {} ({} items, {})",
            marker,
            i,
            bill.title(),
            bill.items().len(),
            status
        );
    }
}

fn cmd_new_bill(args: &[String], store: &mut JsonFileStore) {
    let opts = Options::parse(args, &["--title"], &[]);
    let mut ledger = load_ledger(store);
    let index = ledger
        .create_bill(opts.require("--title"))
        .unwrap_or_else(|e| fail(e));
    save_ledger(&ledger, store);
    println!("Created bill [{}]", index);
}

fn cmd_select(args: &[String], store: &mut JsonFileStore) {
    let opts = Options::parse(args, &["--index"], &[]);
    let mut ledger = load_ledger(store);
    let title = ledger
        .select_bill(opts.index("--index"))
        .unwrap_or_else(|e| fail(e))
        .title()
        .to_string();
    save_ledger(&ledger, store);
    println!("Active bill: {}", title);
}

fn cmd_rename(args: &[String], store: &mut JsonFileStore) {
    let opts = Options::parse(args, &["--title"], &[]);
    let mut ledger = load_ledger(store);
    ledger
        .rename_active_bill(opts.require("--title"), &mut rand::thread_rng())
        .unwrap_or_else(|e| fail(e));
    save_ledger(&ledger, store);
}

fn cmd_delete_bill(store: &mut JsonFileStore) {
    let mut ledger = load_ledger(store);
    let removed = ledger.delete_active_bill().unwrap_or_else(|e| fail(e));
    save_ledger(&ledger, store);
    println!("Deleted '{}' and {} items", removed.title(), removed.items().len());
}

fn cmd_delete_all(store: &mut JsonFileStore) {
    let mut ledger = load_ledger(store);
    ledger.delete_all();
    save_ledger(&ledger, store);
    println!("Deleted all bills");
}

fn cmd_add(args: &[String], store: &mut JsonFileStore) {
    let opts = Options::parse(
        args,
        &["--value", "--title", "--participants"],
        &["--each", "--credit"],
    );
    let roster = store.load_participants().unwrap_or_else(|e| fail(e));
    let selected: Vec<Participant> = opts
        .get("--participants")
        .map(split_list)
        .unwrap_or_default()
        .into_iter()
        .map(Participant::new)
        .collect();
    if let Some(unknown) = selected.iter().find(|p| !roster.contains(p)) {
        fail(RosterError::Unknown(unknown.clone()));
    }

    let mut ledger = load_ledger(store);
    let item = ledger
        .create_item(
            opts.require("--value"),
            opts.get("--title"),
            &selected,
            opts.has("--each"),
            opts.has("--credit"),
            &mut rand::thread_rng(),
        )
        .unwrap_or_else(|e| fail(e));
    println!(
        "Added {} split between {}",
        item.currency().format_cents(item.signed_cents()),
        item.participants().len()
    );
    save_ledger(&ledger, store);
}

fn cmd_delete_item(args: &[String], store: &mut JsonFileStore) {
    let opts = Options::parse(args, &["--index"], &[]);
    let mut ledger = load_ledger(store);
    let removed = ledger
        .delete_item(opts.index("--index"), &mut rand::thread_rng())
        .unwrap_or_else(|e| fail(e));
    save_ledger(&ledger, store);
    println!(
        "Deleted item {}",
        removed.title().unwrap_or("(untitled)")
    );
}

fn cmd_show(store: &JsonFileStore) {
    let ledger = load_ledger(store);
    match ledger.active_bill() {
        Some(bill) => print!("{}", bill),
        None => println!("No active bill."),
    }
}

fn cmd_standings(args: &[String], store: &JsonFileStore) {
    let opts = Options::parse(args, &["--format"], &[]);
    let ledger = load_ledger(store);
    match opts.get("--format").unwrap_or("text") {
        "json" => {
            let json = serde_json::to_string_pretty(ledger.totals()).unwrap_or_else(|e| fail(e));
            println!("{}", json);
        }
        "text" => print!("{}", ledger.totals()),
        other => fail(format!("unknown format '{}', expected text or json", other)),
    }
}

fn cmd_archive(store: &JsonFileStore) {
    let ledger = load_ledger(store);
    for bill in ledger.bills() {
        println!("{}", bill);
    }
    print!("{}", ledger.totals());
}

fn cmd_participants(args: &[String], store: &mut JsonFileStore) {
    let mut roster: Roster = store.load_participants().unwrap_or_else(|e| fail(e));
    let action = args.first().map(|s| s.as_str()).unwrap_or("list");
    let argument = args.get(1).map(|s| s.as_str());

    let result = match (action, argument) {
        ("list", None) => Ok(()),
        ("add", Some(name)) => roster.add(name).map(|_| ()),
        ("remove", Some(name)) => roster.remove(name).map(|_| ()),
        ("replace", Some(list)) => roster.replace(split_list(list)),
        _ => fail("usage: tabulator participants [list|add NAME|remove NAME|replace A,B,...]"),
    };
    result.unwrap_or_else(|e| fail(e));

    if action != "list" {
        store.save_participants(&roster).unwrap_or_else(|e| fail(e));
    }
    for participant in roster.participants() {
        println!("{}", participant);
    }
}

fn cmd_generate(args: &[String]) {
    let opts = Options::parse(
        args,
        &["--participants", "--items", "--currencies", "--seed"],
        &[],
    );
    let mut config = RandomBillConfig::default();
    if opts.get("--participants").is_some() {
        config.participant_count = opts.index("--participants");
    }
    if opts.get("--items").is_some() {
        config.item_count = opts.index("--items");
    }
    if let Some(list) = opts.get("--currencies") {
        config.currencies = split_list(list).into_iter().map(CurrencyKey::before).collect();
    }
    let mut rng = match opts.get("--seed") {
        Some(_) => StdRng::seed_from_u64(opts.index("--seed") as u64),
        None => StdRng::from_entropy(),
    };

    let bill = generate_random_bill(&config, &mut rng);
    let aggregates = SettlementEngine::recompute_bill(&bill, &mut rng);
    for (i, item) in bill.items().iter().enumerate() {
        println!(
            "  [{}] {} between {}",
            i,
            item.currency().format_cents(item.signed_cents()),
            item.participants().len()
        );
    }
    print!("{}", aggregates);
}

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().collect();
    let data_dir = take_data_dir(&mut args).unwrap_or_else(|| {
        env::var("TABULATOR_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
    });

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].clone();
    let rest = &args[2..];

    match command.as_str() {
        "help" | "--help" | "-h" => print_usage(),
        "generate" => cmd_generate(rest),
        _ => {
            let mut store = open_store(&data_dir);
            match command.as_str() {
                "bills" => cmd_bills(&store),
                "new-bill" => cmd_new_bill(rest, &mut store),
                "select" => cmd_select(rest, &mut store),
                "rename" => cmd_rename(rest, &mut store),
                "delete-bill" => cmd_delete_bill(&mut store),
                "delete-all" => cmd_delete_all(&mut store),
                "add" => cmd_add(rest, &mut store),
                "delete-item" => cmd_delete_item(rest, &mut store),
                "show" => cmd_show(&store),
                "standings" => cmd_standings(rest, &store),
                "archive" => cmd_archive(&store),
                "participants" => cmd_participants(rest, &mut store),
                _ => {
                    eprintln!("Unknown command: {}", command);
                    print_usage();
                    process::exit(1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_leading_data_dir_is_taken() {
        let mut args = argv(&["tabulator", "--data", "/tmp/books", "bills"]);
        assert_eq!(take_data_dir(&mut args).as_deref(), Some("/tmp/books"));
        assert_eq!(args, argv(&["tabulator", "bills"]));
    }

    #[test]
    fn test_data_inside_command_options_is_left_alone() {
        let mut args = argv(&["tabulator", "rename", "--title", "--data"]);
        assert_eq!(take_data_dir(&mut args), None);
        assert_eq!(args, argv(&["tabulator", "rename", "--title", "--data"]));

        let opts = Options::parse(&args[2..], &["--title"], &[]);
        assert_eq!(opts.get("--title"), Some("--data"));
    }
}
