// crates/taskdef-core/tests/common/mod.rs
// ============================================================================
// Module: Shared Task Definition Fixtures
// Description: Container documents and specs reused across integration tests.
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a different subset of fixtures.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only fixture construction."
)]

use taskdef_core::FamilyName;
use taskdef_core::LaunchType;
use taskdef_core::NetworkMode;
use taskdef_core::PlacementConstraint;
use taskdef_core::PlacementConstraintType;
use taskdef_core::TaskDefinitionSpec;
use taskdef_core::Volume;
use taskdef_core::VolumeName;
use taskdef_core::parse_container_definitions;

pub type TestResult = Result<(), String>;

/// Jenkins linked to MongoDB, both at cpu 10.
pub const JENKINS_CONTAINERS: &str = r#"[
  {
    "cpu": 10,
    "command": ["sleep", "10"],
    "entryPoint": ["/"],
    "environment": [
      {"name": "VARNAME", "value": "VARVAL"}
    ],
    "essential": true,
    "image": "jenkins",
    "links": ["mongodb"],
    "memory": 128,
    "name": "jenkins",
    "portMappings": [
      {"containerPort": 80, "hostPort": 8080}
    ]
  },
  {
    "cpu": 10,
    "command": ["sleep", "10"],
    "entryPoint": ["/"],
    "essential": true,
    "image": "mongodb",
    "memory": 128,
    "name": "mongodb",
    "portMappings": [
      {"containerPort": 28017, "hostPort": 28017}
    ]
  }
]"#;

/// Same as [`JENKINS_CONTAINERS`] with MongoDB at cpu 20.
pub const JENKINS_CONTAINERS_MODIFIED: &str = r#"[
  {
    "cpu": 10,
    "command": ["sleep", "10"],
    "entryPoint": ["/"],
    "environment": [
      {"name": "VARNAME", "value": "VARVAL"}
    ],
    "essential": true,
    "image": "jenkins",
    "links": ["mongodb"],
    "memory": 128,
    "name": "jenkins",
    "portMappings": [
      {"containerPort": 80, "hostPort": 8080}
    ]
  },
  {
    "cpu": 20,
    "command": ["sleep", "10"],
    "entryPoint": ["/"],
    "essential": true,
    "image": "mongodb",
    "memory": 128,
    "name": "mongodb",
    "portMappings": [
      {"containerPort": 28017, "hostPort": 28017}
    ]
  }
]"#;

/// Wordpress with every structured list populated, plus three busybox peers.
pub const ARRAYS_CONTAINERS: &str = r#"[
  {
    "name": "wordpress",
    "image": "wordpress",
    "essential": true,
    "links": ["container1", "container2", "container3"],
    "portMappings": [
      {"containerPort": 80},
      {"containerPort": 81},
      {"containerPort": 82}
    ],
    "environment": [
      {"name": "VARNAME1", "value": "VARVAL1"},
      {"name": "VARNAME2", "value": "VARVAL2"},
      {"name": "VARNAME3", "value": "VARVAL3"}
    ],
    "extraHosts": [
      {"hostname": "host1", "ipAddress": "127.0.0.1"},
      {"hostname": "host2", "ipAddress": "127.0.0.2"},
      {"hostname": "host3", "ipAddress": "127.0.0.3"}
    ],
    "mountPoints": [
      {"sourceVolume": "vol1", "containerPath": "/vol1"},
      {"sourceVolume": "vol2", "containerPath": "/vol2"},
      {"sourceVolume": "vol3", "containerPath": "/vol3"}
    ],
    "volumesFrom": [
      {"sourceContainer": "container1"},
      {"sourceContainer": "container2"},
      {"sourceContainer": "container3"}
    ],
    "ulimits": [
      {"name": "core", "softLimit": 10, "hardLimit": 20},
      {"name": "cpu", "softLimit": 10, "hardLimit": 20},
      {"name": "fsize", "softLimit": 10, "hardLimit": 20}
    ],
    "linuxParameters": {
      "capabilities": {
        "add": ["AUDIT_CONTROL", "AUDIT_WRITE", "BLOCK_SUSPEND"],
        "drop": ["CHOWN", "IPC_LOCK", "KILL"]
      }
    },
    "devices": [
      {"hostPath": "/path1", "permissions": ["read", "write", "mknod"]},
      {"hostPath": "/path2", "permissions": ["read", "write"]},
      {"hostPath": "/path3", "permissions": ["read", "mknod"]}
    ],
    "dockerSecurityOptions": ["label:one", "label:two", "label:three"],
    "memory": 500,
    "cpu": 10
  },
  {"name": "container1", "image": "busybox", "memory": 100},
  {"name": "container2", "image": "busybox", "memory": 100},
  {"name": "container3", "image": "busybox", "memory": 100}
]"#;

/// Single sleeping busybox container.
pub const SLEEP_CONTAINERS: &str = r#"[
  {
    "name": "sleep",
    "image": "busybox",
    "cpu": 10,
    "command": ["sleep", "360"],
    "memory": 10,
    "essential": true
  }
]"#;

/// Same container as [`SLEEP_CONTAINERS`] with `command` as a scalar string.
pub const SLEEP_CONTAINERS_SCALAR_COMMAND: &str = r#"[
  {
    "name": "sleep",
    "image": "busybox",
    "cpu": 10,
    "command": "sleep 360",
    "memory": 10,
    "essential": true
  }
]"#;

/// Builds a spec from a family and a container document.
pub fn spec(family: &str, containers: &str) -> TaskDefinitionSpec {
    let definitions = parse_container_definitions(containers, "container_definitions")
        .unwrap_or_else(|errors| panic!("fixture containers invalid: {errors:?}"));
    TaskDefinitionSpec::new(FamilyName::new(family), definitions)
}

/// Builds a host volume.
pub fn host_volume(name: &str, host_path: &str) -> Volume {
    Volume {
        name: VolumeName::new(name),
        host_path: Some(host_path.to_string()),
    }
}

/// Jenkins/MongoDB spec with the `jenkins-home` volume at `host_path`.
pub fn jenkins_spec(containers: &str, host_path: &str) -> TaskDefinitionSpec {
    let mut spec = spec("terraform-acc-test", containers);
    spec.volumes = vec![host_volume("jenkins-home", host_path)];
    spec.placement_constraints = vec![PlacementConstraint {
        constraint_type: PlacementConstraintType::MemberOf,
        expression: Some("attribute:ecs.availability-zone in [us-west-2a, us-west-2b]".to_string()),
    }];
    spec
}

/// Wordpress array fixture with volumes `vol1`..`vol3`.
pub fn arrays_spec() -> TaskDefinitionSpec {
    let mut spec = spec("terraform-acc-test-arrays", ARRAYS_CONTAINERS);
    spec.volumes = vec![
        host_volume("vol1", "/host/vol1"),
        host_volume("vol2", "/host/vol2"),
        host_volume("vol3", "/host/vol3"),
    ];
    spec
}

/// Fargate spec: awsvpc, 256 CPU units, 512 MiB.
pub fn fargate_spec() -> TaskDefinitionSpec {
    let mut spec = spec("terraform-acc-test-fargate", SLEEP_CONTAINERS);
    spec.network_mode = NetworkMode::Awsvpc;
    spec.requires_compatibilities.insert(LaunchType::Fargate);
    spec.cpu = Some("256".to_string());
    spec.memory = Some("512".to_string());
    spec
}

/// Sleep spec with a scratch volume.
pub fn scratch_spec() -> TaskDefinitionSpec {
    let mut spec = spec("terraform-acc-sc-volume-test", SLEEP_CONTAINERS);
    spec.volumes = vec![Volume {
        name: VolumeName::new("database_scratch"),
        host_path: None,
    }];
    spec
}

/// Fails with `message` unless `condition` holds.
pub fn ensure(condition: bool, message: impl Into<String>) -> TestResult {
    if condition { Ok(()) } else { Err(message.into()) }
}
