use sluice::{Dynamic, Pipeline};

#[derive(Debug)]
struct Reading {
    sensor: &'static str,
    value: f64,
}

#[tokio::main]
async fn main() -> sluice::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let raw = vec![
        ("temp", "21.5"),
        ("humidity", "n/a"),
        ("temp", "22.0"),
        ("pressure", "1013"),
    ];

    // unparseable readings travel on as their original text
    let parsed = Pipeline::from_iter(raw).map(|(sensor, text)| match text.parse::<f64>() {
        Ok(value) => Box::new(Reading { sensor, value }) as Dynamic,
        Err(_) => Box::new(text.to_string()) as Dynamic,
    });

    for reading in parsed.try_recast::<Reading>().to_sequence().await? {
        match reading {
            Ok(reading) => println!("{} = {}", reading.sensor, reading.value),
            Err(e) => println!("skipped: {e}"),
        }
    }

    // recast silently drops the text elements, a warning with the count is logged
    let readings = Pipeline::from_iter(vec![
        Box::new(Reading {
            sensor: "temp",
            value: 19.0,
        }) as Dynamic,
        Box::new("offline") as Dynamic,
    ])
    .recast::<Reading>()
    .to_sequence()
    .await?;
    println!("{readings:?}");

    Ok(())
}
