//! Event handling scenarios for the reconciler, driven through the
//! dispatch table against in-memory collaborators.
#![allow(clippy::unwrap_used)]

mod common;

use pretty_assertions::assert_eq;

use common::{FakeUnit, FakeWorkload};
use coredns_operator_core::corefile::COREFILE_PATH;
use coredns_operator_core::model::{LAYER_LABEL, SERVICE_NAME};
use coredns_operator_core::{
    Action, CharmConfig, Context, CoreError, Dispatcher, Event, EventName, Reconciler,
    Reconciliation, Relation, RelationData, RelationId, SkipReason, UnitStatus, Workload,
};

const COREFILE_BASE: &str = "\
.:53 {
    errors
    health {
      lameduck 5s
    }
    ready
    kubernetes cluster.local in-addr.arpa ip6.arpa {
      fallthrough in-addr.arpa ip6.arpa
    }
    prometheus :9153
    forward . 1.1.1.1
    cache 30
    loop
    reload
    loadbalance
}
";

const EXTRA_SERVER: &str = "\
example.org:53 {
    whoami
    log
}
";

fn dispatch(
    reconciler: &Reconciler,
    workload: &mut FakeWorkload,
    unit: &mut FakeUnit,
    event: Event,
) -> Result<Reconciliation, CoreError> {
    let mut ctx = Context { workload, unit };
    Dispatcher::standard().dispatch(reconciler, &mut ctx, &event)
}

fn expected_relation_data(ip: &str) -> RelationData {
    RelationData::from([
        ("domain".to_owned(), "cluster.local".to_owned()),
        ("sdn-ip".to_owned(), ip.to_owned()),
        ("port".to_owned(), "53".to_owned()),
    ])
}

// ── Container ready ─────────────────────────────────────────────────

#[test]
fn container_ready_pushes_layers_and_starts() {
    let mut workload = FakeWorkload::default();
    let mut unit = FakeUnit::leader();
    let outcome = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut unit,
        Event::new(EventName::CorednsPebbleReady),
    )
    .unwrap();

    assert_eq!(
        workload.pushes,
        vec![(COREFILE_PATH.to_owned(), COREFILE_BASE.to_owned(), true)]
    );
    assert_eq!(workload.layer_calls, vec![(LAYER_LABEL.to_owned(), true)]);
    assert_eq!(workload.starts, vec![SERVICE_NAME.to_owned()]);
    assert!(workload.is_running(SERVICE_NAME));

    let plan = workload.plan().unwrap();
    let spec = &plan.services[SERVICE_NAME];
    assert_eq!(spec.command, "/coredns -conf /etc/coredns/Corefile");
    assert_eq!(spec.summary, "CoreDNS");

    assert_eq!(
        outcome.status,
        Some(UnitStatus::waiting("Awaiting dns-provider relation"))
    );
    assert!(matches!(outcome.actions[0], Action::Pushed { .. }));
    assert!(matches!(outcome.actions[2], Action::Started { .. }));
}

#[test]
fn container_ready_when_active_is_a_no_op() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();
    let reconciler = Reconciler::default();

    for _ in 0..2 {
        let outcome = dispatch(
            &reconciler,
            &mut workload,
            &mut unit,
            Event::new(EventName::CorednsPebbleReady),
        )
        .unwrap();
        assert_eq!(outcome.skipped, Some(SkipReason::AlreadyStarted));
        assert_eq!(
            outcome.skipped.unwrap().to_string(),
            "CoreDNS already started"
        );
        assert_eq!(outcome.status, None);
        assert!(outcome.actions.is_empty());
    }

    assert!(workload.pushes.is_empty());
    assert!(workload.layer_calls.is_empty());
    assert!(workload.starts.is_empty());
}

#[test]
fn container_ready_on_unreachable_workload_propagates() {
    let mut workload = FakeWorkload {
        unreachable: true,
        ..FakeWorkload::default()
    };
    let err = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut FakeUnit::leader(),
        Event::new(EventName::CorednsPebbleReady),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::WorkloadUnreachable { .. }));
}

// ── Config changed ──────────────────────────────────────────────────

#[test]
fn config_changed_pushes_rendered_corefile_when_active() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();

    let base = Reconciler::new(CharmConfig::default());
    dispatch(&base, &mut workload, &mut unit, Event::new(EventName::ConfigChanged)).unwrap();

    let extra = Reconciler::new(CharmConfig {
        extra_servers: EXTRA_SERVER.into(),
        ..CharmConfig::default()
    });
    let outcome =
        dispatch(&extra, &mut workload, &mut unit, Event::new(EventName::ConfigChanged)).unwrap();

    assert_eq!(
        workload.pushes,
        vec![
            (COREFILE_PATH.to_owned(), COREFILE_BASE.to_owned(), true),
            (
                COREFILE_PATH.to_owned(),
                format!("{COREFILE_BASE}\n{EXTRA_SERVER}"),
                true
            ),
        ]
    );
    assert_eq!(outcome.pushes(), 1);
    assert_eq!(outcome.status, None);
    assert!(workload.starts.is_empty(), "config changes must not restart");
}

#[test]
fn config_changed_substitutes_forward_target() {
    let mut workload = FakeWorkload::active();
    let reconciler = Reconciler::new(CharmConfig {
        forward: "8.8.8.8".into(),
        ..CharmConfig::default()
    });
    dispatch(
        &reconciler,
        &mut workload,
        &mut FakeUnit::leader(),
        Event::new(EventName::ConfigChanged),
    )
    .unwrap();

    let pushed = workload.pull(COREFILE_PATH).unwrap();
    assert_eq!(
        pushed,
        COREFILE_BASE.replace("forward . 1.1.1.1", "forward . 8.8.8.8")
    );
}

#[test]
fn config_changed_when_not_running_skips_push() {
    for mut workload in [
        FakeWorkload::inactive(),
        FakeWorkload::default(),
        FakeWorkload {
            unreachable: true,
            ..FakeWorkload::active()
        },
    ] {
        let outcome = dispatch(
            &Reconciler::default(),
            &mut workload,
            &mut FakeUnit::leader(),
            Event::new(EventName::ConfigChanged),
        )
        .unwrap();
        assert_eq!(outcome.skipped, Some(SkipReason::NotRunning));
        assert_eq!(outcome.skipped.unwrap().to_string(), "CoreDNS is not running");
        assert!(workload.pushes.is_empty());
    }
}

#[test]
fn malformed_extra_servers_are_still_written() {
    let mut workload = FakeWorkload::active();
    let reconciler = Reconciler::new(CharmConfig {
        extra_servers: "broken {\n".into(),
        ..CharmConfig::default()
    });
    dispatch(
        &reconciler,
        &mut workload,
        &mut FakeUnit::leader(),
        Event::new(EventName::ConfigChanged),
    )
    .unwrap();
    assert!(workload.pull(COREFILE_PATH).unwrap().ends_with("\nbroken {\n"));
}

// ── dns-provider relation changed ───────────────────────────────────

#[test]
fn relation_changed_publishes_when_ready() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();
    let id = unit.relate(Some("127.0.0.1"));

    let outcome = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut unit,
        Event::relation_changed(id),
    )
    .unwrap();

    assert_eq!(unit.app_data(id), expected_relation_data("127.0.0.1"));
    assert_eq!(outcome.published(), Some(&expected_relation_data("127.0.0.1")));
    assert_eq!(outcome.status, Some(UnitStatus::active("CoreDNS started")));
}

#[test]
fn relation_changed_without_ingress_address_enters_maintenance() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();
    let id = unit.relate(None);

    let outcome = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut unit,
        Event::relation_changed(id),
    )
    .unwrap();

    assert_eq!(unit.writes, 0);
    assert_eq!(outcome.skipped, Some(SkipReason::NoIngressAddress));
    assert_eq!(outcome.status, Some(UnitStatus::maintenance("")));
}

#[test]
fn relation_changed_while_inactive_waits() {
    let mut workload = FakeWorkload::inactive();
    let mut unit = FakeUnit::leader();
    let id = unit.relate(Some("127.0.0.1"));

    let outcome = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut unit,
        Event::relation_changed(id),
    )
    .unwrap();

    assert_eq!(unit.writes, 0);
    assert_eq!(
        outcome.status,
        Some(UnitStatus::waiting("CoreDNS is not running"))
    );
}

#[test]
fn relation_changed_on_non_leader_always_waits_for_leadership() {
    let cases = [
        (FakeWorkload::active(), Some("127.0.0.1")),
        (FakeWorkload::active(), None),
        (FakeWorkload::inactive(), Some("127.0.0.1")),
        (FakeWorkload::default(), None),
    ];
    for (mut workload, address) in cases {
        let mut unit = FakeUnit::default();
        let id = unit.relate(address);
        let outcome = dispatch(
            &Reconciler::default(),
            &mut workload,
            &mut unit,
            Event::relation_changed(id),
        )
        .unwrap();
        assert_eq!(
            outcome.status,
            Some(UnitStatus::waiting("Waiting for leadership"))
        );
        assert_eq!(unit.writes, 0);
    }
}

#[test]
fn relation_changed_is_idempotent() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();
    let id = unit.relate(Some("10.152.183.10"));
    let reconciler = Reconciler::default();

    let first = dispatch(&reconciler, &mut workload, &mut unit, Event::relation_changed(id)).unwrap();
    let second = dispatch(&reconciler, &mut workload, &mut unit, Event::relation_changed(id)).unwrap();

    assert_eq!(first, second);
    assert_eq!(unit.app_data(id), expected_relation_data("10.152.183.10"));
}

#[test]
fn relation_changed_for_unknown_relation_is_an_error() {
    let err = dispatch(
        &Reconciler::default(),
        &mut FakeWorkload::active(),
        &mut FakeUnit::leader(),
        Event::relation_changed(RelationId(42)),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::RelationNotFound { id } if id == RelationId(42)));
}

#[test]
fn relation_changed_on_another_endpoint_publishes_nothing() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();
    let id = RelationId(5);
    unit.relations.push(Relation {
        id,
        endpoint: "metrics".into(),
        remote_app: "prometheus".into(),
        units: vec!["prometheus/0".into()],
    });
    unit.addresses.insert(id, "10.9.9.9".parse().unwrap());

    let err = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut unit,
        Event::relation_changed(id),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::WrongEndpoint { id: got, ref endpoint, .. } if got == id && endpoint == "metrics"
    ));
    assert!(unit.app_data(id).is_empty());
    assert_eq!(unit.writes, 0);
}

#[test]
fn relation_event_without_relation_id_is_rejected() {
    let err = dispatch(
        &Reconciler::default(),
        &mut FakeWorkload::active(),
        &mut FakeUnit::leader(),
        Event::new(EventName::DnsProviderRelationChanged),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::MissingRelation { .. }));
}

// ── Install / leader elected ────────────────────────────────────────

#[test]
fn install_waits_for_service_start() {
    let outcome = dispatch(
        &Reconciler::default(),
        &mut FakeWorkload::default(),
        &mut FakeUnit::default(),
        Event::new(EventName::Install),
    )
    .unwrap();
    assert_eq!(
        outcome.status,
        Some(UnitStatus::waiting("Waiting to start service"))
    );

    let running = dispatch(
        &Reconciler::default(),
        &mut FakeWorkload::active(),
        &mut FakeUnit::default(),
        Event::new(EventName::Install),
    )
    .unwrap();
    assert_eq!(running.status, None);
}

#[test]
fn leader_elected_republishes_every_relation() {
    let mut workload = FakeWorkload::active();
    let mut unit = FakeUnit::leader();
    let bound = unit.relate(Some("10.0.0.1"));
    let other = unit.relate(Some("10.0.0.2"));

    let outcome = dispatch(
        &Reconciler::default(),
        &mut workload,
        &mut unit,
        Event::new(EventName::LeaderElected),
    )
    .unwrap();

    assert_eq!(unit.app_data(bound), expected_relation_data("10.0.0.1"));
    assert_eq!(unit.app_data(other), expected_relation_data("10.0.0.2"));
    assert_eq!(outcome.actions.len(), 2);
    assert_eq!(outcome.status, Some(UnitStatus::active("CoreDNS started")));
}

#[test]
fn leader_elected_walks_the_status_ladder() {
    let reconciler = Reconciler::default();
    let event = Event::new(EventName::LeaderElected);

    let follower = dispatch(&reconciler, &mut FakeWorkload::active(), &mut FakeUnit::default(), event)
        .unwrap();
    assert_eq!(
        follower.status,
        Some(UnitStatus::waiting("Waiting for leadership"))
    );

    let stopped = dispatch(&reconciler, &mut FakeWorkload::inactive(), &mut FakeUnit::leader(), event)
        .unwrap();
    assert_eq!(
        stopped.status,
        Some(UnitStatus::waiting("Waiting to start service"))
    );

    let lonely = dispatch(&reconciler, &mut FakeWorkload::active(), &mut FakeUnit::leader(), event)
        .unwrap();
    assert_eq!(
        lonely.status,
        Some(UnitStatus::waiting("Awaiting dns-provider relation"))
    );
}

// ── Dispatcher ──────────────────────────────────────────────────────

#[test]
fn unregistered_event_is_reported() {
    let dispatcher = Dispatcher::empty();
    let mut workload = FakeWorkload::default();
    let mut unit = FakeUnit::default();
    let mut ctx = Context {
        workload: &mut workload,
        unit: &mut unit,
    };
    let err = dispatcher
        .dispatch(&Reconciler::default(), &mut ctx, &Event::new(EventName::Install))
        .unwrap_err();
    assert_eq!(err.to_string(), "No handler registered for event 'install'");
}
