use std::sync::Arc;

use dao_impl_sqlite::{
    booking::BookingDaoImpl, vehicle::VehicleDaoImpl, vehicle_location::VehicleLocationDaoImpl,
    PermissionDaoImpl, TransactionDaoImpl, TransactionImpl,
};
#[cfg(feature = "mock_auth")]
use service::permission::MockContext;
use service_impl::{
    availability::AvailabilityServiceDeps, booking::BookingServiceDeps,
    permission::PermissionServiceDeps, vehicle::VehicleServiceDeps,
    vehicle_location::VehicleLocationServiceDeps,
};
use sqlx::SqlitePool;
#[cfg(feature = "json_logging")]
use tracing_subscriber::fmt::format::FmtSpan;

#[cfg(feature = "mock_auth")]
type UserService = service_impl::UserServiceDev;
#[cfg(feature = "mock_auth")]
type Context = MockContext;
type Transaction = TransactionImpl;
type TransactionDao = TransactionDaoImpl;
type PermissionDao = PermissionDaoImpl;
type VehicleDao = VehicleDaoImpl;
type BookingDao = BookingDaoImpl;
type VehicleLocationDao = VehicleLocationDaoImpl;

type ClockService = service_impl::clock::ClockServiceImpl;
type UuidService = service_impl::uuid_service::UuidServiceImpl;

pub struct PermissionServiceDependencies;
impl PermissionServiceDeps for PermissionServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type PermissionDao = PermissionDao;
    type UserService = UserService;
    type TransactionDao = TransactionDao;
}
type PermissionService =
    service_impl::permission::PermissionServiceImpl<PermissionServiceDependencies>;

pub struct VehicleServiceDependencies;
impl VehicleServiceDeps for VehicleServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type VehicleDao = VehicleDao;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type VehicleService = service_impl::vehicle::VehicleServiceImpl<VehicleServiceDependencies>;

pub struct BookingServiceDependencies;
impl BookingServiceDeps for BookingServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type VehicleService = VehicleService;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type BookingService = service_impl::booking::BookingServiceImpl<BookingServiceDependencies>;

pub struct AvailabilityServiceDependencies;
impl AvailabilityServiceDeps for AvailabilityServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type BookingDao = BookingDao;
    type VehicleService = VehicleService;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type TransactionDao = TransactionDao;
}
type AvailabilityService =
    service_impl::availability::AvailabilityServiceImpl<AvailabilityServiceDependencies>;

pub struct VehicleLocationServiceDependencies;
impl VehicleLocationServiceDeps for VehicleLocationServiceDependencies {
    type Context = Context;
    type Transaction = Transaction;
    type VehicleLocationDao = VehicleLocationDao;
    type VehicleService = VehicleService;
    type PermissionService = PermissionService;
    type ClockService = ClockService;
    type UuidService = UuidService;
    type TransactionDao = TransactionDao;
}
type VehicleLocationService =
    service_impl::vehicle_location::VehicleLocationServiceImpl<VehicleLocationServiceDependencies>;

#[derive(Clone)]
pub struct RestStateImpl {
    permission_service: Arc<PermissionService>,
    vehicle_service: Arc<VehicleService>,
    booking_service: Arc<BookingService>,
    availability_service: Arc<AvailabilityService>,
    vehicle_location_service: Arc<VehicleLocationService>,
}

impl rest::RestStateDef for RestStateImpl {
    type PermissionService = PermissionService;
    type VehicleService = VehicleService;
    type BookingService = BookingService;
    type AvailabilityService = AvailabilityService;
    type VehicleLocationService = VehicleLocationService;

    fn backend_version(&self) -> Arc<str> {
        Arc::from(env!("CARGO_PKG_VERSION"))
    }

    fn permission_service(&self) -> Arc<Self::PermissionService> {
        self.permission_service.clone()
    }
    fn vehicle_service(&self) -> Arc<Self::VehicleService> {
        self.vehicle_service.clone()
    }
    fn booking_service(&self) -> Arc<Self::BookingService> {
        self.booking_service.clone()
    }
    fn availability_service(&self) -> Arc<Self::AvailabilityService> {
        self.availability_service.clone()
    }
    fn vehicle_location_service(&self) -> Arc<Self::VehicleLocationService> {
        self.vehicle_location_service.clone()
    }
}

impl RestStateImpl {
    pub fn new(pool: Arc<sqlx::Pool<sqlx::Sqlite>>) -> Self {
        let transaction_dao = Arc::new(TransactionDao::new(pool.clone()));
        let permission_dao = Arc::new(PermissionDao::new(pool.clone()));
        let vehicle_dao = Arc::new(VehicleDao::new(pool.clone()));
        let booking_dao = Arc::new(BookingDao::new(pool.clone()));
        let vehicle_location_dao = Arc::new(VehicleLocationDao::new(pool));

        let user_service = Arc::new(service_impl::UserServiceDev);
        let clock_service = Arc::new(service_impl::clock::ClockServiceImpl);
        let uuid_service = Arc::new(service_impl::uuid_service::UuidServiceImpl);
        let permission_service = Arc::new(PermissionService::new(
            permission_dao,
            user_service,
            transaction_dao.clone(),
        ));
        let vehicle_service = Arc::new(VehicleService::new(
            vehicle_dao,
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            transaction_dao.clone(),
        ));
        let booking_service = Arc::new(BookingService::new(
            booking_dao.clone(),
            vehicle_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
            uuid_service.clone(),
            transaction_dao.clone(),
        ));
        let availability_service = Arc::new(AvailabilityService::new(
            booking_dao,
            vehicle_service.clone(),
            permission_service.clone(),
            clock_service.clone(),
            transaction_dao.clone(),
        ));
        let vehicle_location_service = Arc::new(VehicleLocationService::new(
            vehicle_location_dao,
            vehicle_service.clone(),
            permission_service.clone(),
            clock_service,
            uuid_service,
            transaction_dao,
        ));

        Self {
            permission_service,
            vehicle_service,
            booking_service,
            availability_service,
            vehicle_location_service,
        }
    }
}

async fn create_admin_user(pool: Arc<SqlitePool>, username: &str) {
    use dao::{PermissionDao as _, TransactionDao as _};

    // On development create the DEVUSER and give it admin permissions.
    let transaction_dao = TransactionDaoImpl::new(pool.clone());
    let permission_dao = PermissionDaoImpl::new(pool);
    let tx = transaction_dao
        .new_transaction()
        .await
        .expect("Expected a transaction");

    let users = permission_dao
        .all_users(tx.clone())
        .await
        .expect("Expected users");
    let contains_admin_user = users.iter().any(|user| user.name.as_ref() == username);
    if !contains_admin_user {
        permission_dao
            .create_user(
                &dao::UserEntity {
                    name: username.into(),
                },
                "dev-first-start",
                tx.clone(),
            )
            .await
            .expect("Expected being able to create the dev user");
        permission_dao
            .add_user_role(username, "admin", "dev-first-start", tx.clone())
            .await
            .expect("Expected being able to grant the admin role");
    }
    transaction_dao
        .commit(tx)
        .await
        .expect("Expected the bootstrap transaction to commit");
}

#[tokio::main]
async fn main() {
    let version = env!("CARGO_PKG_VERSION");

    #[cfg(feature = "local_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::TRACE)
        .pretty()
        .with_file(true)
        .finish();

    #[cfg(feature = "json_logging")]
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_span_list(true)
        .with_file(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    tracing::info!("Fleetly backend version: {}", version);
    dotenvy::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./localdb.sqlite3".to_string());
    let pool = Arc::new(
        SqlitePool::connect(&database_url)
            .await
            .expect("Could not connect to database"),
    );

    // Apply SQLite-specific migrations
    sqlx::migrate!("../migrations/sqlite")
        .run(pool.as_ref())
        .await
        .expect("Failed to run migrations");

    let rest_state = RestStateImpl::new(pool.clone());
    create_admin_user(pool.clone(), "DEVUSER").await;
    create_admin_user(pool, "admin").await;

    rest::start_server(rest_state).await
}
