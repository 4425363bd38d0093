use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use monitoria::workflows::allocation::{AllocationPolicy, AllocationService};
use monitoria::workflows::applications::ApplicationService;
use monitoria::workflows::memory::{
    InMemoryApplicationStore, InMemoryDirectory, InMemoryPeriodStore, InMemoryProjectStore,
};
use monitoria::workflows::notifications::Notifier;
use monitoria::workflows::periods::PeriodService;
use monitoria::workflows::projects::ProjectService;
use monitoria::workflows::selection::SelectionService;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Every workflow service wired over one set of in-memory stores.
pub(crate) struct Engine<N> {
    pub(crate) directory: Arc<InMemoryDirectory>,
    pub(crate) enrollment: Arc<PeriodService<InMemoryPeriodStore, InMemoryApplicationStore>>,
    pub(crate) proposals: Arc<ProjectService<InMemoryProjectStore, N, InMemoryDirectory>>,
    pub(crate) allocations: Arc<AllocationService<InMemoryPeriodStore, InMemoryProjectStore>>,
    pub(crate) candidacies:
        Arc<ApplicationService<InMemoryPeriodStore, InMemoryProjectStore, InMemoryApplicationStore>>,
    pub(crate) selection: Arc<
        SelectionService<InMemoryProjectStore, InMemoryApplicationStore, InMemoryDirectory, N>,
    >,
}

impl<N> Engine<N>
where
    N: Notifier + 'static,
{
    pub(crate) fn in_memory(notifier: Arc<N>, policy: AllocationPolicy) -> Self {
        let periods = Arc::new(InMemoryPeriodStore::default());
        let projects = Arc::new(InMemoryProjectStore::default());
        let applications = Arc::new(InMemoryApplicationStore::default());
        let directory = Arc::new(InMemoryDirectory::default());

        let enrollment = Arc::new(PeriodService::new(periods.clone(), applications.clone()));
        let proposals = Arc::new(ProjectService::new(
            projects.clone(),
            notifier.clone(),
            directory.clone(),
        ));
        let allocations = Arc::new(AllocationService::new(
            periods.clone(),
            projects.clone(),
            policy,
        ));
        let candidacies = Arc::new(ApplicationService::new(
            periods,
            projects.clone(),
            applications.clone(),
        ));
        let selection = Arc::new(SelectionService::new(
            projects,
            applications,
            directory.clone(),
            notifier,
        ));

        Self {
            directory,
            enrollment,
            proposals,
            allocations,
            candidacies,
            selection,
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
