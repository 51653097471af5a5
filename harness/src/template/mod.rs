//! Input-template generation.
//!
//! With no input file, the harness introspects the model's declared
//! fields through the capability interface and emits an editable
//! skeleton (`inputTemplate.txt`) that the resolver can read back once
//! filled in: usage notes, every reserved key parameter as an empty
//! assignment, every model field as an empty assignment, and suggested
//! `*agentInfo` / `*edgeList` lines.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::HarnessError;
use crate::model::SimulationModel;

/// Default template file name.
pub const TEMPLATE_FILE: &str = "inputTemplate.txt";

const USAGE: &str = "\
% How to use:
% This file sets model parameter values for one or more simulations and
% declares which results to collect.
% To assign a value to a parameter, put the desired value after the equals
% sign. Strings and characters are read as-is, without quotation marks.
% A parameter assigned multiple space-separated values is swept: simulations
% run for every combination of swept parameter values, for example:
%\tparameter = 0 1 2
% A parameter may instead be drawn randomly per iteration:
%\tparameter = U(<start>,<stop>)
%\tparameter = C(<number of discrete options>)
%\tparameter = N(<mean>,<standard deviation>)
%\tparameter = G(<mean>,<standard deviation>,<optional minimum>)
% To collect a model-level field as a result, leave its line empty:
%\tresult =
% Remove every field you do not want to set or collect. Model-level results
% are written to <fname>endresults.txt at the end of each simulation and to
% <fname>timeresults.txt at set intervals throughout.
% To collect agent-level data, keep the names you want after '*agentInfo';
% agent results are written to <fname>agentresults.txt. Delete the whole
% line to collect none.
% To export a network as an edge list, keep its name after '*edgeList';
% each network is written to <fname><network>edgelist.txt.
% Comments are indicated by the '%' character.
";

const KEY_PARAM_LINES: &str = "\
% Key Parameters:
*seed =  % random seed for the first replicate of each combination (incremented per replicate)
*sep =  % separator character for the output files (defaults to comma)
*steps =  % number of timesteps each simulation is run for
*iters =  % number of sets of randomly drawn parameters
*reps =  % number of simulations run for each combination of parameter values
*fname =  % prefix for the names of all output files
*testint =  % how often timecourse data is collected (in steps)
*teststart =  % how many steps in to start collecting timecourse data (defaults to 0)
*gui =  % run interactively, binding only the initial parameter values (defaults to false)
*agentint =  % how often agent-level data is collected (0 = every test step)
*netint =  % how often edge lists are written (0 = every test step)
*listint =  % how often list-type data is written (0 = every test step)
";

/// Write the template to the default location in the working directory.
pub fn write_template(model: &dyn SimulationModel) -> Result<(), HarnessError> {
    write_template_to(model, Path::new(TEMPLATE_FILE))
}

/// Write the template to a specific path.
pub fn write_template_to(model: &dyn SimulationModel, path: &Path) -> Result<(), HarnessError> {
    let file = File::create(path).map_err(|source| HarnessError::OutputFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mut w = BufWriter::new(file);

    let write = |w: &mut BufWriter<File>, text: &str| {
        w.write_all(text.as_bytes())
            .map_err(|source| HarnessError::OutputFile {
                path: path.to_path_buf(),
                source,
            })
    };

    write(&mut w, USAGE)?;
    write(&mut w, "\n")?;
    write(&mut w, KEY_PARAM_LINES)?;

    write(&mut w, "% Model Parameters:\n")?;
    for name in model.param_names() {
        write(&mut w, &format!("{} = \n", name))?;
    }

    write(&mut w, "% Agent Parameters:\n")?;
    write(
        &mut w,
        &format!("*agentInfo = {}\n", model.agent_param_names().join(" ")),
    )?;

    let networks = model.network_names();
    if !networks.is_empty() {
        write(&mut w, "% Networks:\n")?;
        write(&mut w, &format!("*edgeList = {}\n", networks.join(" ")))?;
    }

    w.flush().map_err(|source| HarnessError::OutputFile {
        path: path.to_path_buf(),
        source,
    })
}
