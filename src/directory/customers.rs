use crate::domain::{Customer, CustomerId, Email, Gender, PhoneNumber};
use crate::enrollment::{CustomerKey, EnrollmentError, EnrollmentResult};
use crate::store::{StoreError, Stores};

pub struct CustomerDirectory {
    stores: Stores,
}

impl CustomerDirectory {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Register a new customer. Last names are unique.
    ///
    /// The early lookup gives a quick answer; commit re-checks under the
    /// commit lock, so concurrent registrations of one last name cannot both
    /// succeed.
    pub async fn register_customer(
        &self,
        first_name: &str,
        last_name: &str,
        gender: Gender,
        email: Option<Email>,
        phone_number: Option<PhoneNumber>,
    ) -> EnrollmentResult<Customer> {
        let mut customer = Customer::new(first_name, last_name, gender);
        customer.email = email;
        customer.phone_number = phone_number;
        customer.validate()?;

        let mut uow = self.stores.begin();
        if uow.customer_by_last_name(last_name).await?.is_some() {
            tracing::warn!(last_name, "Customer already registered");
            return Err(EnrollmentError::CustomerAlreadyExists(last_name.to_string()));
        }

        let id = customer.id;
        uow.stage_customer(customer.clone());
        let mut committed = match uow.commit().await {
            Ok(committed) => committed,
            Err(StoreError::DuplicateKey { .. }) => {
                tracing::warn!(last_name, "Customer registered concurrently");
                return Err(EnrollmentError::CustomerAlreadyExists(last_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let customer = committed.take_customer(id).unwrap_or(customer);

        tracing::info!(customer_id = %id, last_name, "✅ Registered customer");
        Ok(customer)
    }

    pub async fn find_customer(&self, id: CustomerId) -> EnrollmentResult<Customer> {
        self.stores
            .customers
            .find_by_id(id)
            .await?
            .ok_or(EnrollmentError::CustomerNotFound(CustomerKey::Id(id)))
    }

    pub async fn find_customer_by_last_name(&self, last_name: &str) -> EnrollmentResult<Customer> {
        self.stores
            .customers
            .find_by_last_name(last_name)
            .await?
            .ok_or_else(|| EnrollmentError::CustomerNotFound(CustomerKey::LastName(last_name.to_string())))
    }

    pub async fn find_customer_by_first_name(&self, first_name: &str) -> EnrollmentResult<Option<Customer>> {
        Ok(self.stores.customers.find_by_first_name(first_name).await?)
    }

    pub async fn list_customers(&self) -> EnrollmentResult<Vec<Customer>> {
        Ok(self.stores.customers.find_all().await?)
    }

    /// Drop every customer. Course back-references are left as they are.
    pub async fn remove_all_customers(&self) -> EnrollmentResult<()> {
        let mut uow = self.stores.begin();
        uow.stage_customer_purge();
        uow.commit().await?;
        tracing::info!("Removed all customers");
        Ok(())
    }
}
