use rs_seq_core::config::{ColumnSelection, TrainConfig};
use rs_seq_core::io::load_rows;
use rs_seq_core::model::pipeline::{load_trained, train_sequential};
use rs_seq_core::model::query::{parse_user_items, PrefixPolicy, RecommendQuery};
use rs_seq_core::model::recommender::{recommend, recommend_next};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Rows with a missing cell or an unparseable timestamp are dropped
    let rows = load_rows("./data/transactions.csv", ',')?;
    let columns = ColumnSelection::new("session_id", "timestamp", "item");

    // Order 1: predict the next item from the previous one.
    // Transitions seen fewer than 'min_support' times are pruned
    let config = TrainConfig::new(1, 1, "./models");
    let trained = train_sequential(&rows, &columns, &config)?;
    println!("Trained: {:?}", trained.metadata);
    println!("Readable model saved to {}", trained.paths.readable.display());

    // Only the last item is used as the prefix
    let items = parse_user_items("Tea, Milk");
    for (i, item) in recommend_next(&items, &trained.readable, 3).to_lines().iter().enumerate() {
        println!("{}. {}", i + 1, item);
    }

    // Unknown prefixes return a message, not an error
    println!("{}", recommend_next(&["Caviar"], &trained.readable, 3));

    // Reload from disk, as the server does at startup
    let reloaded = load_trained("./models")?;
    println!("Reloaded order {} model with {} prefixes", reloaded.metadata.order, reloaded.readable.len());

    // An order-2 model needs the last two items
    let config = TrainConfig::new(2, 1, "./models/order2");
    let trained = train_sequential(&rows, &columns, &config)?;
    let query = RecommendQuery::new(3)?.with_policy(PrefixPolicy::TrainedOrder);
    println!("After Milk, Bread: {}", recommend(&["Milk", "Bread"], &trained.readable, &query));

    // Invalid parameters are rejected
    match RecommendQuery::new(0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{e}"),
    }

    Ok(())
}
