pub mod parser;

mod utils;

use anyhow::Error;
use config::{Config, DatasetConfig};
use dataset::{load_movies, load_ratings, Catalog, Rating, ToTable, UserId};
use engine::{Engine, HybridMethod, MatrixBuilder, RatingMatrix, Recommended, SearchParams};
use evaluator::Evaluator;
use parser::Statement;
use simplelog::{LevelFilter, TermLogger, TerminalMode};
use std::str::FromStr;
use utils::{profile_table, recommendations_table, similarities_table};

macro_rules! prompt {
    ($ed:ident) => {{
        prompt!($ed, "")
    }};

    ($ed:ident, $db:expr) => {{
        use rustyline::error::ReadlineError;

        let msg = if $db.is_empty() {
            format!("{}", PROMPT)
        } else {
            format!("({}) {}", $db, PROMPT)
        };

        match $ed.readline(&msg) {
            Ok(line) => {
                $ed.add_history_entry(line.as_str());
                Ok(line)
            }

            Err(ReadlineError::Interrupted) => {
                continue;
            }

            Err(ReadlineError::Eof) => {
                if $db.is_empty() {
                    println!("Exiting...Good bye!");
                } else {
                    println!("Disconnecting from {}", $db);
                }

                break;
            }

            Err(e) => Err(e),
        }
    }};
}

fn print_connected_help() {
    println!("Dataset commands:");
    println!("h | help                             Shows this help");
    println!("q | quit                             Quit");
    println!("d | disconnect                       Disconnect from the dataset");
    println!("v | version                          Show version");
    println!("recommend(<user>, <n>[, '<genre>'])  Hybrid recommendations");
    println!("cf(<user>, <n>[, '<genre>'])         Collaborative filtering only");
    println!("cb(<user>, <n>[, '<genre>'])         Content-based only");
    println!("popular(<n>[, '<genre>'])            Most popular movies");
    println!("similar(<user>, <n>)                 Most similar users");
    println!("predict(<user>, <movie>)             Predict a single rating");
    println!("profile(<user>)                      Genre profile of a user");
    println!("movie(<id>)                          Movie details");
    println!("ratings(<user>)                      Ratings of a user");
    println!("genres                               Genres in the catalog");
    println!("evaluate[(<users>)]                  Hold-out evaluation");
}

fn build_matrix(
    records: &[Rating],
    config: &Config,
    required: impl Into<Option<UserId>>,
) -> RatingMatrix {
    MatrixBuilder::new()
        .max_users(config.engine.max_users)
        .max_items(config.engine.max_items)
        .required_user(required)
        .build(records)
}

fn print_recommended(result: &Recommended) {
    if result.cold_start {
        println!("Cold start fallback used for this user");
    }

    if result.items.is_empty() {
        println!("No recommendations found");
    } else {
        println!("{}", recommendations_table(&result.items));
    }
}

fn run_statement(
    statement: Statement,
    config: &Config,
    records: &[Rating],
    catalog: &Catalog,
    params: SearchParams,
) {
    match statement {
        Statement::Connect(_) => println!("Invalid in this context!"),

        Statement::Recommend(user_id, top_n, genre) => {
            let method = match HybridMethod::from_str(&config.hybrid.method) {
                Ok(method) => method,
                Err(e) => {
                    println!("{}", e);
                    return;
                }
            };

            let matrix = build_matrix(records, config, user_id);
            let engine = Engine::with_params(&matrix, catalog, params);

            match engine.recommend(
                user_id,
                top_n,
                genre.as_deref(),
                config.hybrid.cf_weight,
                config.hybrid.cb_weight,
                method,
            ) {
                Ok(result) => print_recommended(&result),
                Err(e) => println!("{}", e),
            }
        }

        Statement::Collaborative(user_id, top_n, genre) => {
            let matrix = build_matrix(records, config, user_id);
            let engine = Engine::with_params(&matrix, catalog, params);

            print_recommended(&engine.collaborative(user_id, top_n, genre.as_deref()));
        }

        Statement::ContentBased(user_id, top_n, genre) => {
            let matrix = build_matrix(records, config, user_id);
            let engine = Engine::with_params(&matrix, catalog, params);

            let items = engine.content_based(user_id, top_n, genre.as_deref());
            if items.is_empty() {
                println!("No recommendations found for id({})", user_id);
            } else {
                println!("{}", recommendations_table(&items));
            }
        }

        Statement::Popular(top_n, genre) => {
            let matrix = build_matrix(records, config, None::<UserId>);
            let engine = Engine::with_params(&matrix, catalog, params);

            let items = engine.popular(top_n, genre.as_deref(), None);
            if items.is_empty() {
                println!("No popular movies matched");
            } else {
                println!("{}", recommendations_table(&items));
            }
        }

        Statement::Similar(user_id, count) => {
            let matrix = build_matrix(records, config, user_id);
            let engine = Engine::with_params(&matrix, catalog, params);

            let mut neighbours = engine.similar_users(user_id);
            if neighbours.is_empty() {
                println!("No similar users found for id({})", user_id);
            } else {
                neighbours.truncate(count);
                println!("{}", similarities_table(&neighbours));
            }
        }

        Statement::Predict(user_id, movie_id) => {
            let matrix = build_matrix(records, config, user_id);
            let engine = Engine::with_params(&matrix, catalog, params);

            let title = catalog
                .get(movie_id)
                .map(|movie| movie.title.clone())
                .unwrap_or_else(|| format!("id({})", movie_id));

            match engine.predict(user_id, movie_id) {
                Some(score) => println!("Predicted score for {} is {:.2}", title, score),
                None => println!("No prediction available for {}", title),
            }
        }

        Statement::Profile(user_id) => {
            let matrix = build_matrix(records, config, user_id);
            let engine = Engine::with_params(&matrix, catalog, params);

            let profile = engine.genre_profile(user_id);
            if profile.is_empty() {
                println!("No profile available for id({})", user_id);
            } else {
                println!("{}", profile_table(&profile));
            }
        }

        Statement::Movie(movie_id) => match catalog.get(movie_id) {
            Some(movie) => println!("{}", movie.to_table()),
            None => println!("No movie found with id({})", movie_id),
        },

        Statement::Ratings(user_id) => {
            let matrix = build_matrix(records, config, user_id);

            match matrix.user_ratings(user_id) {
                Some(ratings) if !ratings.is_empty() => println!("{}", ratings.to_table()),
                _ => println!("No ratings found for id({})", user_id),
            }
        }

        Statement::Genres => {
            for genre in catalog.genres() {
                println!("{}", genre);
            }
        }

        Statement::Evaluate(sample) => {
            let mut eval_config = config.evaluation.clone();
            if sample.is_some() {
                eval_config.sample_users = sample;
            }

            let report = Evaluator::new(records, catalog)
                .with_params(params)
                .max_users(config.engine.max_users)
                .max_items(config.engine.max_items)
                .evaluate(&eval_config);

            println!("{}", report.to_table());
        }
    }
}

fn dataset_connected_prompt(config: &Config, dataset: &DatasetConfig) -> Result<(), Error> {
    let records = load_ratings(&dataset.ratings)?;
    let movies = load_movies(&dataset.movies)?;
    let catalog = Catalog::from_movies(movies);

    let params = SearchParams {
        min_common: config.engine.min_common,
        top_k: config.engine.top_k_similar,
    };

    let name = &dataset.name;
    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let opt: String = prompt!(rl, name)?;

        match opt.trim() {
            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "d" | "disconnect" => {
                println!("Disconnecting from dataset {}", name);
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            "?" | "h" | "help" => print_connected_help(),

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(statement) => run_statement(statement, config, &records, &catalog, params),
                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
const PROMPT: &str = ">> ";
const CONFIG_FILE: &str = "movie-rec.toml";

fn main() -> Result<(), Error> {
    TermLogger::init(
        LevelFilter::Info,
        simplelog::Config::default(),
        TerminalMode::Mixed,
    )?;

    let config = Config::load(CONFIG_FILE)?;

    println!("Welcome to movie-rec {}", VERSION);
    let mut rl = rustyline::Editor::<()>::new();

    loop {
        let opt: String = prompt!(rl)?;

        match opt.trim() {
            "?" | "h" | "help" => {
                println!("Main help:");
                println!("h | help                Shows this help");
                println!("q | quit                Quit");
                println!("v | version             Show version");
                println!("connect(<dataset>)      Connect to a configured dataset");

                print!("Available datasets:");
                for dataset in &config.datasets {
                    print!(" {}", dataset.name);
                }
                println!();
            }

            "q" | "quit" => {
                println!("Bye!");
                break;
            }

            "v" | "version" => {
                println!("version: {}", VERSION);
            }

            empty if empty.is_empty() => {}

            line => match parser::parse_line(line) {
                Some(statement) => {
                    if let Statement::Connect(name) = statement {
                        match config.dataset(&name) {
                            Some(dataset) => {
                                if let Err(e) = dataset_connected_prompt(&config, dataset) {
                                    log::error!("Could not use dataset {}: {}", name, e);
                                }
                            }

                            None => println!("Unknown dataset '{}', see 'help'", name),
                        }
                    } else {
                        println!("Invalid statement in this context!");
                    }
                }

                None => println!("Invalid syntax!"),
            },
        }
    }

    Ok(())
}
