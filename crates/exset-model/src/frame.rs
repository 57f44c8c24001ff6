//! Polars DataFrame interop.

use polars::prelude::{Column as FrameColumn, DataFrame, DataType, NamedFrom, Series, TimeUnit};

use crate::dataset::{Column, ColumnValues, Dataset};
use crate::error::Result;

impl Dataset {
    /// Convert a DataFrame. Integer widths widen to int64, floats to float64,
    /// dates and date-times become naive nanoseconds, everything else is
    /// rendered as strings.
    pub fn from_dataframe(frame: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(frame.width());
        for column in frame.get_columns() {
            let name = column.name().to_string();
            let series = column.as_materialized_series();
            let values = match series.dtype() {
                DataType::Boolean => ColumnValues::Boolean(series.bool()?.into_iter().collect()),
                DataType::Float32 | DataType::Float64 => {
                    let cast = series.cast(&DataType::Float64)?;
                    ColumnValues::Float64(cast.f64()?.into_iter().collect())
                }
                DataType::Date | DataType::Datetime(_, _) => {
                    let cast = series
                        .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))?
                        .cast(&DataType::Int64)?;
                    ColumnValues::Timestamp(cast.i64()?.into_iter().collect())
                }
                dtype if dtype.is_integer() => {
                    let cast = series.cast(&DataType::Int64)?;
                    ColumnValues::Int64(cast.i64()?.into_iter().collect())
                }
                _ => {
                    let cast = series.cast(&DataType::String)?;
                    ColumnValues::Utf8(
                        cast.str()?
                            .into_iter()
                            .map(|value| value.map(str::to_string))
                            .collect(),
                    )
                }
            };
            columns.push(Column::new(name, values));
        }
        Dataset::with_columns(columns)
    }

    /// Convert into a DataFrame. Timestamps become `Datetime(ns)` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<FrameColumn> = Vec::with_capacity(self.num_columns());
        for column in self.columns() {
            let name = column.name.as_str().into();
            let series = match &column.values {
                ColumnValues::Int64(values) => Series::new(name, values.as_slice()),
                ColumnValues::Float64(values) => Series::new(name, values.as_slice()),
                ColumnValues::Boolean(values) => Series::new(name, values.as_slice()),
                ColumnValues::Utf8(values) => Series::new(name, values.as_slice()),
                ColumnValues::Timestamp(values) => Series::new(name, values.as_slice())
                    .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))?,
            };
            columns.push(FrameColumn::from(series));
        }
        Ok(DataFrame::new(columns)?)
    }
}
