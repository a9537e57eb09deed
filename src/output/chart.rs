// Two-panel PNG chart: price with moving averages above, volume below.
use crate::analyzer::IndicatorColumns;
use crate::model::{Bar, OutputError};
use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 1000;
const PRICE_PANEL_HEIGHT: u32 = 720;

const MA_FAST_COLOR: RGBColor = RGBColor(255, 165, 0);
const MA_MID_COLOR: RGBColor = RGBColor(0, 150, 0);
const MA_SLOW_COLOR: RGBColor = RGBColor(200, 30, 30);
const VOLUME_COLOR: RGBColor = RGBColor(128, 128, 128);
const VOLUME_MA_COLOR: RGBColor = RGBColor(128, 0, 128);

pub fn render_chart(
    path: &Path,
    company: &str,
    ticker: &str,
    currency: &str,
    bars: &[Bar],
    cols: &IndicatorColumns,
) -> Result<(), OutputError> {
    if bars.is_empty() {
        return Err(OutputError::Chart("no bars to draw".into()));
    }

    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.timestamp.date_naive()).collect();
    let first = dates[0];
    let last = dates[dates.len() - 1] + Duration::days(1);

    let mut price_min = f64::MAX;
    let mut price_max = f64::MIN;
    for i in 0..bars.len() {
        for v in [bars[i].close, cols.ma_fast[i], cols.ma_mid[i], cols.ma_slow[i]] {
            price_min = price_min.min(v);
            price_max = price_max.max(v);
        }
    }
    let pad = ((price_max - price_min) * 0.05).max(1.0);
    let price_range = (price_min - pad)..(price_max + pad);

    let volume_max = bars.iter().map(|b| b.volume).fold(0.0_f64, f64::max);
    let volume_range = 0.0..(volume_max * 1.1).max(1.0);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(to_chart_error)?;
    let (price_area, volume_area) = root.split_vertically(PRICE_PANEL_HEIGHT);

    let mut price_chart = ChartBuilder::on(&price_area)
        .margin(10)
        .caption(
            format!("{} ({}) price and moving averages", company, ticker),
            ("sans-serif", 28),
        )
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last, price_range)
        .map_err(to_chart_error)?;

    price_chart
        .configure_mesh()
        .y_desc(format!("price ({})", currency))
        .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
        .draw()
        .map_err(to_chart_error)?;

    price_chart
        .draw_series(LineSeries::new(
            dates.iter().zip(bars.iter()).map(|(&d, b)| (d, b.close)),
            &BLUE,
        ))
        .map_err(to_chart_error)?
        .label("close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    for (values, color, label) in [
        (&cols.ma_fast, MA_FAST_COLOR, "MA20"),
        (&cols.ma_mid, MA_MID_COLOR, "MA50"),
        (&cols.ma_slow, MA_SLOW_COLOR, "MA200"),
    ] {
        price_chart
            .draw_series(LineSeries::new(
                dates.iter().zip(values.iter()).map(|(&d, &v)| (d, v)),
                &color,
            ))
            .map_err(to_chart_error)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    price_chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(to_chart_error)?;

    let mut volume_chart = ChartBuilder::on(&volume_area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last, volume_range)
        .map_err(to_chart_error)?;

    volume_chart
        .configure_mesh()
        .y_desc("volume")
        .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
        .draw()
        .map_err(to_chart_error)?;

    volume_chart
        .draw_series(dates.iter().zip(bars.iter()).map(|(&d, b)| {
            Rectangle::new(
                [(d, 0.0), (d + Duration::days(1), b.volume)],
                VOLUME_COLOR.mix(0.5).filled(),
            )
        }))
        .map_err(to_chart_error)?
        .label("volume")
        .legend(|(x, y)| {
            Rectangle::new([(x, y - 5), (x + 20, y + 5)], VOLUME_COLOR.mix(0.5).filled())
        });

    volume_chart
        .draw_series(LineSeries::new(
            dates.iter().zip(cols.volume_ma.iter()).map(|(&d, &v)| (d, v)),
            &VOLUME_MA_COLOR,
        ))
        .map_err(to_chart_error)?
        .label("volume MA20")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], VOLUME_MA_COLOR));

    volume_chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(to_chart_error)?;

    root.present().map_err(to_chart_error)?;
    Ok(())
}

fn to_chart_error<E: std::fmt::Display>(error: E) -> OutputError {
    OutputError::Chart(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn renders_png_for_a_plain_series() {
        let bars: Vec<Bar> = (0..60)
            .map(|i| Bar {
                timestamp: Utc.timestamp_opt(1_600_000_000 + 86_400 * i, 0).unwrap(),
                open: 100.0 + i as f64,
                high: 101.0 + i as f64,
                low: 99.0 + i as f64,
                close: 100.5 + i as f64,
                volume: 1_000_000.0 + (i as f64) * 10_000.0,
            })
            .collect();
        let cols = IndicatorColumns::compute(&bars);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        render_chart(&path, "Test Corp", "TEST", "USD", &bars, &cols).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn empty_series_is_a_soft_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");
        let result = render_chart(&path, "Test", "TEST", "USD", &[], &IndicatorColumns::default());
        assert!(matches!(result, Err(OutputError::Chart(_))));
    }
}
