// crates/taskdef-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared TOML fixtures for config tests.
// Purpose: Reduce duplication across taskdef-config integration tests.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use taskdef_config::TaskdefConfig;

pub type TestResult = Result<(), String>;

/// Jenkins and MongoDB declared with a host volume and a placement constraint.
pub const JENKINS_TOML: &str = r#"
[registry]
type = "memory"
region = "us-west-2"
account_id = "123456789012"

[[task_definition]]
name = "jenkins"
family = "terraform-acc-test"
container_definitions = '''
[
  {
    "cpu": 10,
    "command": ["sleep", "10"],
    "entryPoint": ["/"],
    "environment": [{"name": "VARNAME", "value": "VARVAL"}],
    "essential": true,
    "image": "jenkins",
    "links": ["mongodb"],
    "memory": 128,
    "name": "jenkins",
    "portMappings": [{"containerPort": 80, "hostPort": 8080}]
  },
  {
    "cpu": 10,
    "command": ["sleep", "10"],
    "entryPoint": ["/"],
    "essential": true,
    "image": "mongodb",
    "memory": 128,
    "name": "mongodb",
    "portMappings": [{"containerPort": 28017, "hostPort": 28017}]
  }
]
'''

[[task_definition.volume]]
name = "jenkins-home"
host_path = "/ecs/jenkins-home"

[[task_definition.placement_constraints]]
type = "memberOf"
expression = "attribute:ecs.availability-zone in [us-west-2a, us-west-2b]"
"#;

/// Fargate sleep task.
pub const FARGATE_TOML: &str = r#"
[[task_definition]]
name = "fargate"
family = "terraform-acc-test-fargate"
network_mode = "awsvpc"
cpu = "256"
memory = "512"
requires_compatibilities = ["FARGATE"]
container_definitions = '''
[{"name": "sleep", "image": "busybox", "cpu": 10, "command": ["sleep", "360"], "memory": 10}]
'''
"#;

/// Parses a TOML string into a config without running validation.
pub fn config_from_toml(toml_str: &str) -> Result<TaskdefConfig, String> {
    toml::from_str(toml_str).map_err(|err| err.to_string())
}

/// Returns a single-resource TOML document followed by `extra` lines.
pub fn sleep_resource(extra: &str) -> String {
    let base = r#"[[task_definition]]
name = "sleep"
family = "sleep"
container_definitions = '''[{"name": "sleep", "image": "busybox", "command": ["sleep", "360"]}]'''
"#;
    format!("{base}{extra}\n")
}
