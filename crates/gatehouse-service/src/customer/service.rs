use std::sync::Arc;

use gatehouse_core::clock::SharedClock;
use gatehouse_core::types::{PageQuery, PageResult};
use gatehouse_db::model::customer::{Customer, CustomerChanges, NewCustomer};
use gatehouse_db::store::CustomerRepository;
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInput {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_status: String,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
    clock: SharedClock,
}

impl CustomerService {
    #[must_use]
    pub fn new(customers: Arc<dyn CustomerRepository>, clock: SharedClock) -> Self {
        Self { customers, clock }
    }

    /// ## Errors
    /// Returns a storage error if the page cannot be read.
    pub async fn list(
        &self,
        page: PageQuery,
        keyword: Option<&str>,
    ) -> ServiceResult<PageResult<Customer>> {
        let (_, limit) = page.normalized();
        let (customers, total) = self
            .customers
            .page_customers(keyword, page.offset(), limit)
            .await?;
        Ok(PageResult::new(customers, total, page))
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown customer.
    pub async fn get(&self, id: i64) -> ServiceResult<Customer> {
        self.customers
            .find_customer(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("customer {id}")))
    }

    /// ## Errors
    /// Returns `ValidationError` when the name is blank.
    #[tracing::instrument(skip_all)]
    pub async fn create(&self, input: CustomerInput) -> ServiceResult<Customer> {
        let customer_name = non_empty(input.customer_name).ok_or_else(|| {
            ServiceError::ValidationError("customer name is required".to_owned())
        })?;
        let customer = self
            .customers
            .insert_customer(&NewCustomer {
                customer_name,
                customer_phone: input.customer_phone.trim().to_owned(),
                customer_status: input.customer_status.trim().to_owned(),
            })
            .await?;
        tracing::info!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }

    /// ## Summary
    /// Applies the non-blank fields of `input`; blank fields keep their value.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown customer.
    #[tracing::instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: CustomerInput) -> ServiceResult<Customer> {
        let changes = CustomerChanges {
            customer_name: non_empty(input.customer_name),
            customer_phone: non_empty(input.customer_phone),
            customer_status: non_empty(input.customer_status),
            updated_at: self.clock.now(),
        };
        self.customers
            .update_customer(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("customer {id}")))
    }

    /// ## Errors
    /// Returns `NotFound` for an unknown customer.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.customers.delete_customer(id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!("customer {id}")))
        }
    }
}
