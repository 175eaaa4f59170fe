//! Assembles one [`DailyRecord`] from the eleven resource calls of a day.

use crate::{DailyRecord, DataClient, FitbitError, Resource, Session, observability};
use chrono::NaiveDate;
use tracing::info;

#[derive(Clone, Debug)]
pub struct DailyRetriever {
    client: DataClient,
}

impl DailyRetriever {
    pub fn new(client: DataClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &DataClient {
        &self.client
    }

    /// Fetch every resource for `date`, one call after another. The first
    /// failing call aborts the day; no partial record is returned.
    pub async fn retrieve_day(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> Result<DailyRecord, FitbitError> {
        let user_id = session.user_id().await;
        let mut record = DailyRecord::empty(date);
        for resource in Resource::ALL {
            let url = self.client.resource_url(&user_id, resource, date);
            let body = self.client.fetch(&url, session).await?;
            record.apply(resource, &body);
        }
        observability::record_day();
        info!(%date, "retrieved daily record");
        Ok(record)
    }

    /// Inclusive range, oldest first. Each record goes to `on_day` as soon as
    /// it is complete; the first failing day or callback stops the walk.
    pub async fn retrieve_range<F, E>(
        &self,
        session: &Session,
        from: NaiveDate,
        to: NaiveDate,
        mut on_day: F,
    ) -> Result<(), E>
    where
        F: FnMut(DailyRecord) -> Result<(), E>,
        E: From<FitbitError>,
    {
        if from > to {
            return Err(FitbitError::Config(format!(
                "date range start {from} is after end {to}"
            ))
            .into());
        }
        for date in from.iter_days().take_while(|d| *d <= to) {
            on_day(self.retrieve_day(session, date).await?)?;
        }
        Ok(())
    }
}
