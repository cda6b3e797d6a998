mod basics;

use basics::{parse_count, parse_id, parse_ident, parse_separator, parse_string};
use dataset::{MovieId, UserId};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::opt;
use nom::sequence::{delimited, pair, preceded, separated_pair};
use nom::IResult;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Statement {
    Connect(String),
    Recommend(UserId, usize, Option<String>),
    Collaborative(UserId, usize, Option<String>),
    ContentBased(UserId, usize, Option<String>),
    Popular(usize, Option<String>),
    Similar(UserId, usize),
    Predict(UserId, MovieId),
    Profile(UserId),
    Movie(MovieId),
    Ratings(UserId),
    Genres,
    Evaluate(Option<usize>),
}

fn parse_genre_filter(input: &str) -> IResult<&str, Option<String>> {
    let (input, genre) = opt(preceded(parse_separator, parse_string))(input)?;

    Ok((input, genre.map(String::from)))
}

fn parse_request(input: &str) -> IResult<&str, (UserId, usize, Option<String>)> {
    let (input, user_id) = parse_id(input)?;
    let (input, _) = parse_separator(input)?;
    let (input, top_n) = parse_count(input)?;
    let (input, genre) = parse_genre_filter(input)?;

    Ok((input, (user_id, top_n, genre)))
}

fn parse_statement(input: &str) -> IResult<&str, Statement> {
    let (input, statement_type) = alt((
        tag("connect"),
        tag("recommend"),
        tag("ratings"),
        tag("popular"),
        tag("predict"),
        tag("profile"),
        tag("similar"),
        tag("evaluate"),
        tag("genres"),
        tag("movie"),
        tag("cf"),
        tag("cb"),
    ))(input)?;

    let (input, statement) = match statement_type {
        "connect" => {
            let (input, name) = delimited(char('('), parse_ident, char(')'))(input)?;
            (input, Statement::Connect(name.to_string()))
        }

        "recommend" => {
            let (input, (user_id, top_n, genre)) =
                delimited(char('('), parse_request, char(')'))(input)?;
            (input, Statement::Recommend(user_id, top_n, genre))
        }

        "cf" => {
            let (input, (user_id, top_n, genre)) =
                delimited(char('('), parse_request, char(')'))(input)?;
            (input, Statement::Collaborative(user_id, top_n, genre))
        }

        "cb" => {
            let (input, (user_id, top_n, genre)) =
                delimited(char('('), parse_request, char(')'))(input)?;
            (input, Statement::ContentBased(user_id, top_n, genre))
        }

        "popular" => {
            let (input, (top_n, genre)) = delimited(
                char('('),
                pair(parse_count, parse_genre_filter),
                char(')'),
            )(input)?;
            (input, Statement::Popular(top_n, genre))
        }

        "similar" => {
            let (input, (user_id, count)) = delimited(
                char('('),
                separated_pair(parse_id, parse_separator, parse_count),
                char(')'),
            )(input)?;
            (input, Statement::Similar(user_id, count))
        }

        "predict" => {
            let (input, (user_id, movie_id)) = delimited(
                char('('),
                separated_pair(parse_id, parse_separator, parse_id),
                char(')'),
            )(input)?;
            (input, Statement::Predict(user_id, movie_id))
        }

        "profile" => {
            let (input, user_id) = delimited(char('('), parse_id, char(')'))(input)?;
            (input, Statement::Profile(user_id))
        }

        "movie" => {
            let (input, movie_id) = delimited(char('('), parse_id, char(')'))(input)?;
            (input, Statement::Movie(movie_id))
        }

        "ratings" => {
            let (input, user_id) = delimited(char('('), parse_id, char(')'))(input)?;
            (input, Statement::Ratings(user_id))
        }

        "genres" => (input, Statement::Genres),

        "evaluate" => {
            let (input, sample) = opt(delimited(char('('), parse_count, char(')')))(input)?;
            (input, Statement::Evaluate(sample))
        }

        _ => unreachable!(),
    };

    Ok((input, statement))
}

pub fn parse_line(input: &str) -> Option<Statement> {
    let input = input.trim();
    let (rest, statement) = parse_statement(input).ok()?;

    if rest.is_empty() {
        Some(statement)
    } else {
        None
    }
}
